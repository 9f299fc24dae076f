//! Cross-source normalization
//!
//! For one hand on one tick, confidences are rescaled to sum to 1 across
//! sources. Hand confidences and each joint index are normalized
//! independently, since a joint may be occluded for one source but not
//! another. A set summing to exactly zero is left untouched.

use crate::hand::JOINT_COUNT;

use super::model::ConfidenceVector;

/// Divide every value by the sum, unless the sum is zero
pub fn normalize(values: &mut [f32]) {
    let sum: f32 = values.iter().sum();
    if sum == 0.0 {
        return;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}

/// Normalize hand confidence and, per joint index, joint confidence
pub fn normalize_confidences(vectors: &mut [ConfidenceVector]) {
    let mut hand: Vec<f32> = vectors.iter().map(|v| v.hand_confidence).collect();
    normalize(&mut hand);
    for (v, h) in vectors.iter_mut().zip(hand) {
        v.hand_confidence = h;
    }

    let mut column = vec![0.0; vectors.len()];
    for joint in 0..JOINT_COUNT {
        for (c, v) in column.iter_mut().zip(vectors.iter()) {
            *c = v.joint_confidence[joint];
        }
        normalize(&mut column);
        for (v, c) in vectors.iter_mut().zip(column.iter()) {
            v.joint_confidence[joint] = *c;
        }
    }
}
