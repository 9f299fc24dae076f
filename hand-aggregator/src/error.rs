//! Configuration and wiring errors
//!
//! Tracking-quality problems (gaps, unavailable history, zero confidence)
//! are never errors; they degrade to well-defined values inside the
//! pipeline. Everything here is raised before the first tick.

use thiserror::Error;

use crate::device::DeviceFamily;

pub type Result<T> = std::result::Result<T, FusionError>;

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("invalid device profile: {0}")]
    InvalidProfile(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no device profile registered for {0:?}")]
    UnknownDevice(DeviceFamily),

    #[error("unknown source id {0}")]
    UnknownSource(usize),

    #[error("expected {expected} joint values, got {actual}")]
    JointCount { expected: usize, actual: usize },

    #[error("expected 7 pose values (x, y, z, qx, qy, qz, qw), got {0}")]
    PoseLength(usize),

    #[error("pose quaternion has zero length")]
    DegenerateRotation,

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
