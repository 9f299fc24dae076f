//! Vector helpers shared by the confidence heuristics and skeleton

use nalgebra::Vector3;

/// Lengths below this are treated as zero
pub const EPSILON: f32 = 1e-5;

/// Angle between two vectors in radians
///
/// Uses dot product formula: cos(θ) = (a · b) / (|a| × |b|)
///
/// Returns `None` if either vector is (near) zero.
pub fn angle_between(a: &Vector3<f32>, b: &Vector3<f32>) -> Option<f32> {
    let mag_a = a.norm();
    let mag_b = b.norm();
    if mag_a < EPSILON || mag_b < EPSILON {
        return None;
    }
    let cos_angle = (a.dot(b) / (mag_a * mag_b)).clamp(-1.0, 1.0);
    Some(cos_angle.acos())
}
