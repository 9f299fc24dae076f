//! Aggregation tuning knobs
//!
//! Everything the engine needs is carried in [`FusionConfig`]. Missing JSON
//! fields fall back to the defaults below; the engine validates the whole
//! config once at construction.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::device::DeviceTable;
use crate::error::{FusionError, Result};
use crate::history::HISTORY_CAPACITY;

/// Weights of the four hand-level confidence signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandWeights {
    pub positional: f32,
    pub rotational: f32,
    pub velocity: f32,
    pub visibility_duration: f32,
}

impl Default for HandWeights {
    fn default() -> Self {
        Self {
            positional: 1.0,
            rotational: 1.0,
            velocity: 0.5,
            visibility_duration: 1.0,
        }
    }
}

impl HandWeights {
    fn as_array(&self) -> [(&'static str, f32); 4] {
        [
            ("positional", self.positional),
            ("rotational", self.rotational),
            ("velocity", self.velocity),
            ("visibility_duration", self.visibility_duration),
        ]
    }
}

/// Weights of the per-joint confidence signals. All zero means every joint
/// gets a uniform confidence of 1 before the hand confidence is applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JointWeights {
    pub occlusion: f32,
    pub bone_view: f32,
}

impl JointWeights {
    pub fn is_uniform(&self) -> bool {
        self.occlusion <= 0.0 && self.bone_view <= 0.0
    }
}

/// How per-source palm rotations are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationBlend {
    /// Running slerp in source order (order-dependent)
    #[default]
    Sequential,
    /// Principal eigenvector of the weighted quaternion outer-product sum
    Eigen,
}

/// Limits on the synchronous occlusion read-back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionBudget {
    /// Sources refreshed on a refresh tick (round-robin beyond this)
    pub max_sources_per_tick: usize,
    /// Refresh every N ticks; cached ratios are reused in between
    pub refresh_interval_ticks: u32,
}

impl Default for OcclusionBudget {
    fn default() -> Self {
        Self {
            max_sources_per_tick: 2,
            refresh_interval_ticks: 2,
        }
    }
}

/// One Euro filter parameters for the fused palm position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    pub min_cutoff: f32,
    /// Speed coefficient - higher = less lag during fast motion
    pub beta: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.15,
        }
    }
}

/// Full aggregation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub hand_weights: HandWeights,
    pub joint_weights: JointWeights,
    /// Samples kept per (source, hand)
    pub history_capacity: usize,
    /// Palm speed (m/s) at which velocity confidence reaches zero
    pub speed_threshold: f32,
    /// Seconds of continuous visibility before a source gets full trust
    pub visibility_ramp_secs: f64,
    /// History older than this many tick intervals counts as lost tracking
    pub stale_after_ticks: u32,
    /// Nominal time between ticks in seconds
    pub tick_interval_secs: f64,
    pub rotation_blend: RotationBlend,
    pub occlusion: OcclusionBudget,
    /// Output smoothing on the fused palm position; off when `None`
    pub smoothing: Option<SmoothingConfig>,
    pub devices: DeviceTable,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            hand_weights: HandWeights::default(),
            joint_weights: JointWeights::default(),
            history_capacity: HISTORY_CAPACITY,
            speed_threshold: 1.0,
            visibility_ramp_secs: 1.0,
            stale_after_ticks: 10,
            tick_interval_secs: 1.0 / 60.0,
            rotation_blend: RotationBlend::Sequential,
            occlusion: OcclusionBudget::default(),
            smoothing: None,
            devices: DeviceTable::default(),
        }
    }
}

impl FusionConfig {
    /// Parse a JSON config and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FusionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        debug!(path = %path.display(), "loaded fusion config");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Maximum age of the newest history sample before velocity is untrusted
    pub fn stale_after_secs(&self) -> f64 {
        self.stale_after_ticks as f64 * self.tick_interval_secs
    }

    pub fn validate(&self) -> Result<()> {
        for (name, w) in self.hand_weights.as_array() {
            check_weight(name, w)?;
        }
        if self.hand_weights.as_array().iter().all(|(_, w)| *w == 0.0) {
            return Err(FusionError::InvalidConfig(
                "at least one hand weight must be positive".into(),
            ));
        }
        check_weight("occlusion", self.joint_weights.occlusion)?;
        check_weight("bone_view", self.joint_weights.bone_view)?;

        if self.history_capacity == 0 {
            return Err(FusionError::InvalidConfig("history_capacity must be at least 1".into()));
        }
        if !(self.speed_threshold.is_finite() && self.speed_threshold > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "speed_threshold must be positive, got {}",
                self.speed_threshold
            )));
        }
        if !(self.visibility_ramp_secs.is_finite() && self.visibility_ramp_secs > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "visibility_ramp_secs must be positive, got {}",
                self.visibility_ramp_secs
            )));
        }
        if !(self.tick_interval_secs.is_finite() && self.tick_interval_secs > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "tick_interval_secs must be positive, got {}",
                self.tick_interval_secs
            )));
        }
        if self.stale_after_ticks == 0 {
            return Err(FusionError::InvalidConfig("stale_after_ticks must be at least 1".into()));
        }
        if self.occlusion.refresh_interval_ticks == 0 {
            return Err(FusionError::InvalidConfig(
                "occlusion.refresh_interval_ticks must be at least 1".into(),
            ));
        }
        if let Some(smoothing) = &self.smoothing {
            if !(smoothing.min_cutoff > 0.0) || !(smoothing.beta >= 0.0) {
                return Err(FusionError::InvalidConfig(format!(
                    "smoothing needs min_cutoff > 0 and beta >= 0, got {smoothing:?}"
                )));
            }
        }
        self.devices.validate()
    }
}

fn check_weight(name: &str, weight: f32) -> Result<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(FusionError::InvalidConfig(format!(
            "weight {name} must be finite and non-negative, got {weight}"
        )))
    }
}
