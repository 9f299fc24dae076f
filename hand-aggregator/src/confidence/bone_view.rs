//! Bone-view joint confidence
//!
//! A bone seen broadside is resolved well; a bone pointing straight at the
//! sensor is foreshortened to a dot and its end joint is poorly placed.
//! Each joint is scored by the bone that ends at it.

use nalgebra::Vector3;

use crate::geometry::angle_between;
use crate::hand::{parent_of, JOINT_COUNT};

/// Score for joints with no incoming bone or a degenerate one
const NEUTRAL: f32 = 1.0;

/// `sin θ` per joint, θ = angle between its bone and the sensor's view ray
pub fn bone_view_confidence(
    joints: &[Vector3<f32>; JOINT_COUNT],
    source_origin: &Vector3<f32>,
) -> [f32; JOINT_COUNT] {
    let mut out = [NEUTRAL; JOINT_COUNT];
    for (joint, score) in out.iter_mut().enumerate() {
        let Some(parent) = parent_of(joint) else {
            continue;
        };
        let bone = joints[joint] - joints[parent];
        let view_ray = joints[joint] - source_origin;
        if let Some(angle) = angle_between(&bone, &view_ray) {
            *score = angle.sin().abs();
        }
    }
    out
}
