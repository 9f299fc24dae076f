//! Hand data model - joint layout, samples, poses
//!
//! Re-exports only. All logic in submodules.

pub mod joints;
mod sample;

pub use joints::*;
pub use sample::{
    palm_direction_from_rotation, palm_normal_from_rotation, Chirality, HandSample, Pose,
    FLAT_POSE_LEN,
};
