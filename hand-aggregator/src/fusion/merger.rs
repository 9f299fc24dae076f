//! Merge per-source samples of one hand into a single fused hand
//!
//! Inputs are source-aligned: `samples[i]` goes with `confidences[i]`, and
//! confidences are already normalized across sources.

use nalgebra::{Matrix4, Quaternion, SymmetricEigen, UnitQuaternion, Vector3};
use serde::Serialize;
use tracing::warn;

use crate::config::RotationBlend;
use crate::confidence::ConfidenceVector;
use crate::hand::{Chirality, HandSample, JOINT_COUNT, MIRRORED_WRIST, WRIST};

/// Below this the slerp is numerically unstable and a normalized lerp is used
const SLERP_EPSILON: f32 = 1.0e-6;

/// One fused hand, before skeleton reconstruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedHand {
    pub chirality: Chirality,
    pub palm_position: Vector3<f32>,
    pub palm_rotation: UnitQuaternion<f32>,
    pub joints: [Vector3<f32>; JOINT_COUNT],
}

impl FusedHand {
    /// Pass a single source's sample through untouched
    pub fn from_sample(sample: &HandSample) -> Self {
        Self {
            chirality: sample.chirality,
            palm_position: sample.palm_position,
            palm_rotation: sample.palm_rotation,
            joints: sample.joints,
        }
    }
}

/// Fuse one hand.
///
/// Returns `None` if there are no samples or every hand confidence is zero.
/// A single sample with nonzero confidence is returned verbatim.
pub fn merge_hands(
    samples: &[HandSample],
    confidences: &[ConfidenceVector],
    blend: RotationBlend,
) -> Option<FusedHand> {
    debug_assert_eq!(samples.len(), confidences.len());
    let first = samples.first()?;
    let hand_weights: Vec<f32> = confidences.iter().map(|c| c.hand_confidence).collect();
    if hand_weights.iter().all(|w| *w == 0.0) {
        return None;
    }
    if samples.len() == 1 {
        return Some(FusedHand::from_sample(first));
    }

    let palm_position = weighted_position(samples.iter().map(|s| s.palm_position), &hand_weights);

    let rotations: Vec<UnitQuaternion<f32>> = samples.iter().map(|s| s.palm_rotation).collect();
    let palm_rotation = match blend {
        RotationBlend::Sequential => sequential_rotation(&rotations, &hand_weights),
        RotationBlend::Eigen => eigen_rotation(&rotations, &hand_weights),
    };

    let mut joints = [Vector3::zeros(); JOINT_COUNT];
    let mut column = vec![0.0; samples.len()];
    for (joint, fused) in joints.iter_mut().enumerate() {
        for (w, c) in column.iter_mut().zip(confidences) {
            *w = c.joint_confidence[joint];
        }
        // No source vouches for this joint: fall back to hand-level trust
        let weights = if column.iter().all(|w| *w == 0.0) {
            &hand_weights
        } else {
            &column
        };
        *fused = weighted_position(samples.iter().map(|s| s.joints[joint]), weights);
    }
    // The mirror is a copy of the wrist, never fused on its own weights
    joints[MIRRORED_WRIST] = joints[WRIST];

    Some(FusedHand {
        chirality: first.chirality,
        palm_position,
        palm_rotation,
        joints,
    })
}

/// Σ wᵢ pᵢ
pub fn weighted_position(
    positions: impl Iterator<Item = Vector3<f32>>,
    weights: &[f32],
) -> Vector3<f32> {
    positions
        .zip(weights)
        .fold(Vector3::zeros(), |acc, (p, w)| acc + p * *w)
}

/// Running slerp in source order.
///
/// Source `i` is blended into the running result with the running result
/// keeping `cum(0..i-1) / cum(0..i)` of the weight. Slerp does not commute,
/// so the result depends on source order.
pub fn sequential_rotation(rotations: &[UnitQuaternion<f32>], weights: &[f32]) -> UnitQuaternion<f32> {
    let Some(first) = rotations.first() else {
        return UnitQuaternion::identity();
    };

    let mut result = *first;
    let mut cumulative = weights.first().copied().unwrap_or(0.0);
    for (rotation, weight) in rotations.iter().zip(weights).skip(1) {
        let total = cumulative + weight;
        if total > 0.0 {
            let keep = cumulative / total;
            result = blend_rotation(rotation, &result, keep);
        }
        cumulative = total;
    }
    result
}

/// Slerp from `from` toward `to` by `t`, falling back to a normalized lerp
/// along the shorter arc when the two are nearly identical.
pub fn blend_rotation(from: &UnitQuaternion<f32>, to: &UnitQuaternion<f32>, t: f32) -> UnitQuaternion<f32> {
    if t <= 0.0 {
        return *from;
    }
    if t >= 1.0 {
        return *to;
    }
    if let Some(q) = from.try_slerp(to, t, SLERP_EPSILON) {
        return q;
    }

    let a = from.quaternion().coords;
    let mut b = to.quaternion().coords;
    if a.dot(&b) < 0.0 {
        b = -b;
    }
    UnitQuaternion::new_normalize(Quaternion::from(a * (1.0 - t) + b * t))
}

/// Weighted quaternion average: principal eigenvector of Σ wᵢ qᵢ qᵢᵀ.
/// Independent of source order.
pub fn eigen_rotation(rotations: &[UnitQuaternion<f32>], weights: &[f32]) -> UnitQuaternion<f32> {
    let mut m = Matrix4::<f32>::zeros();
    for (rotation, weight) in rotations.iter().zip(weights) {
        let q = rotation.quaternion().coords;
        m += q * q.transpose() * *weight;
    }

    let eigen = SymmetricEigen::new(m);
    let principal = eigen.eigenvectors.column(eigen.eigenvalues.imax()).into_owned();
    if principal.norm() < SLERP_EPSILON {
        warn!("degenerate quaternion average, keeping first rotation");
        return rotations.first().copied().unwrap_or_else(UnitQuaternion::identity);
    }
    UnitQuaternion::new_normalize(Quaternion::from(principal))
}
