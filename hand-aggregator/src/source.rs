//! Tracking source boundary
//!
//! Sources are opaque producers of hand samples. The engine asks each one
//! for its fixed [`SourceContext`] once at registration and then polls it
//! once per hand per tick.

use serde::{Deserialize, Serialize};

use crate::device::{DeviceFamily, DeviceProfile, DeviceTable};
use crate::error::Result;
use crate::hand::{Chirality, HandSample, Pose};

/// Stable handle assigned at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub usize);

impl SourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Where a source sits in the world and what it can see
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceContext {
    pub origin: Pose,
    pub profile: DeviceProfile,
}

impl SourceContext {
    pub fn new(origin: Pose, profile: DeviceProfile) -> Self {
        Self { origin, profile }
    }

    /// Context for a known device family, profile taken from `table`
    pub fn for_device(origin: Pose, family: DeviceFamily, table: &DeviceTable) -> Result<Self> {
        Ok(Self::new(origin, table.get(family)?))
    }
}

/// A device (or device driver) that reports hands
pub trait HandSource {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Mounting pose and sensing envelope; queried once at registration
    fn context(&self) -> SourceContext;

    /// This tick's sample for `chirality`, or `None` if that hand is not seen
    fn poll(&mut self, chirality: Chirality) -> Option<HandSample>;
}
