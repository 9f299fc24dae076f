//! Rotational confidence - how squarely the palm faces the sensor
//!
//! A palm seen face-on (toward or away from the sensor) is tracked best; a
//! palm seen edge-on is tracked worst. Palm-toward and palm-away score the
//! same because the sign of the normal is not trusted here.

use nalgebra::Vector3;

use crate::geometry::angle_between;

/// `(cos 2θ + 1) / 2`, where θ is the angle between the palm normal and the
/// direction from the palm to the sensor. Zero for degenerate input.
pub fn rotational_confidence(
    palm_position: &Vector3<f32>,
    palm_normal: &Vector3<f32>,
    source_origin: &Vector3<f32>,
) -> f32 {
    let to_source = source_origin - palm_position;
    match angle_between(palm_normal, &to_source) {
        Some(angle) => (((2.0 * angle).cos() + 1.0) * 0.5).clamp(0.0, 1.0),
        None => 0.0,
    }
}
