//! Hand Aggregator - confidence-weighted fusion of hand tracking sources
//!
//! Several hand trackers (Leap-style IR sensors, stereo cameras) watch the
//! same space from different mounts. Each tick the engine scores every
//! source's view of every hand, normalizes the scores per hand and merges
//! the samples into one pose per chirality.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                       AggregationEngine                        │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌────────────┐   ┌─────────┐  │
//! │  │  Sources  │──▶│  History  │──▶│ Confidence │──▶│Normalize│  │
//! │  │ (poll/push│   │ (ring/src)│   │   Model    │   │per hand │  │
//! │  └───────────┘   └───────────┘   └────────────┘   └─────────┘  │
//! │                                        ▲               │       │
//! │                                        │               ▼       │
//! │                                  ┌───────────┐   ┌─────────┐   │
//! │                                  │ Occlusion │   │ Merger  │   │
//! │                                  │ (ID pass) │   └─────────┘   │
//! │                                  └───────────┘        │        │
//! │                                                       ▼        │
//! │                                                 ┌──────────┐   │
//! │                                                 │ Skeleton │   │
//! │                                                 └──────────┘   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use hand_aggregator::{
//!     AggregationEngine, Chirality, DeviceFamily, FusionConfig, HandSample, Pose, SourceContext,
//!     JOINT_COUNT,
//! };
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let config = FusionConfig::default();
//! let mut engine = AggregationEngine::new(config.clone()).unwrap();
//!
//! // A sensor on the desk looking up
//! let mount = Pose::new(
//!     Vector3::zeros(),
//!     UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -std::f32::consts::FRAC_PI_2),
//! );
//! let context = SourceContext::for_device(mount, DeviceFamily::Leap2, &config.devices).unwrap();
//! let desk = engine.register_context(context).unwrap();
//!
//! let palm = Vector3::new(0.0, 0.25, 0.0);
//! let sample = HandSample::new(
//!     Chirality::Right,
//!     palm,
//!     UnitQuaternion::identity(),
//!     [palm; JOINT_COUNT],
//!     0.0,
//! );
//! let frame = engine.fuse(0.0, &[(desk, sample)]).unwrap();
//! assert_eq!(frame.right().unwrap().hand.palm_position, palm);
//! ```

pub mod config;
pub mod confidence;
pub mod device;
pub mod error;
pub mod fusion;
pub mod geometry;
pub mod hand;
pub mod history;
pub mod source;

#[cfg(feature = "wasm")]
mod bridge;

pub use config::{
    FusionConfig, HandWeights, JointWeights, OcclusionBudget, RotationBlend, SmoothingConfig,
};
pub use confidence::{
    ConfidenceModel, ConfidenceVector, IdPassRenderer, IdPassVisibility, JointVisibility,
};
pub use device::{DeviceFamily, DeviceProfile, DeviceTable};
pub use error::{FusionError, Result};
pub use fusion::{
    AggregationEngine, FusedFrame, FusedFrameConsumer, FusedHand, FusedHandFrame, HandSkeleton,
    TickReport,
};
pub use hand::{Chirality, HandSample, Pose, JOINT_COUNT};
pub use history::HistoryBuffer;
pub use source::{HandSource, SourceContext, SourceId};

#[cfg(feature = "wasm")]
pub use bridge::{
    aggregate_tick, aggregate_tick_now, get_tick_report, init_aggregator, push_hand,
    register_source, source_count, BridgeError,
};

/// Called automatically when WASM module loads
#[cfg(feature = "wasm")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
