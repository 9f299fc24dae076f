//! Confidence module - per-source reliability heuristics
//!
//! Re-exports only. All logic in submodules.

mod bone_view;
mod model;
mod normalize;
mod occlusion;
mod positional;
mod rotational;
mod velocity;
mod visibility;

pub use bone_view::bone_view_confidence;
pub use model::{ConfidenceModel, ConfidenceVector, Observation, SignalBreakdown};
pub use normalize::{normalize, normalize_confidences};
pub use occlusion::{
    joint_id_color, visibility_ratio, IdPass, IdPassRenderer, IdPassVisibility, JointVisibility,
    PixelBuffer, ProjectedJoint,
};
pub use positional::{atan_ease, depth_amplitude, local_positional_confidence, positional_confidence};
pub use rotational::rotational_confidence;
pub use velocity::velocity_confidence;
pub use visibility::{duration_confidence, VisibilityTracker};
