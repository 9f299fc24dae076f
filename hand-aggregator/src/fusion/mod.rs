//! Fusion module - merge, skeleton rebuild and the per-tick engine
//!
//! Re-exports only. All logic in submodules.

mod engine;
mod frame;
mod merger;
mod skeleton;
mod smoothing;

pub use engine::AggregationEngine;
pub use frame::{
    ChiralityReport, FusedFrame, FusedFrameConsumer, FusedHandFrame, SourceContribution,
    TickReport, FLAT_HAND_LEN,
};
pub use merger::{
    blend_rotation, eigen_rotation, merge_hands, sequential_rotation, weighted_position, FusedHand,
};
pub use skeleton::{Bone, Finger, HandSkeleton, SkeletonReconstructor};
pub use smoothing::PalmSmoother;
