//! Device sensing envelopes
//!
//! Each tracking device family sees hands inside a frustum bounded by its
//! field of view and a usable depth range. Positional confidence is shaped
//! by these numbers, so they are looked up from a table keyed by family
//! rather than inferred from whatever type produced the sample.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Known tracking hardware families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFamily {
    LeapMotionController,
    StereoIr170,
    Leap2,
}

impl DeviceFamily {
    pub const ALL: [DeviceFamily; 3] = [
        DeviceFamily::LeapMotionController,
        DeviceFamily::StereoIr170,
        DeviceFamily::Leap2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceFamily::LeapMotionController => "leap_motion_controller",
            DeviceFamily::StereoIr170 => "stereo_ir170",
            DeviceFamily::Leap2 => "leap2",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// Factory envelope for this family (depths in meters)
    pub fn default_profile(&self) -> DeviceProfile {
        match self {
            DeviceFamily::LeapMotionController => DeviceProfile {
                horizontal_fov_deg: 140.0,
                vertical_fov_deg: 120.0,
                min_depth: 0.10,
                ideal_depth_lo: 0.15,
                ideal_depth_hi: 0.35,
                max_depth: 0.60,
            },
            DeviceFamily::StereoIr170 => DeviceProfile {
                horizontal_fov_deg: 170.0,
                vertical_fov_deg: 170.0,
                min_depth: 0.10,
                ideal_depth_lo: 0.20,
                ideal_depth_hi: 0.45,
                max_depth: 0.75,
            },
            DeviceFamily::Leap2 => DeviceProfile {
                horizontal_fov_deg: 160.0,
                vertical_fov_deg: 160.0,
                min_depth: 0.10,
                ideal_depth_lo: 0.15,
                ideal_depth_hi: 0.45,
                max_depth: 0.70,
            },
        }
    }
}

/// Effective sensing envelope of one device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub horizontal_fov_deg: f32,
    pub vertical_fov_deg: f32,
    pub min_depth: f32,
    pub ideal_depth_lo: f32,
    pub ideal_depth_hi: f32,
    pub max_depth: f32,
}

impl DeviceProfile {
    /// Reject envelopes the confidence math cannot work with.
    ///
    /// Both fields of view must lie in (0, 180) degrees and the depth bands
    /// must satisfy `0 <= min < ideal_lo <= ideal_hi < max`.
    pub fn validate(&self) -> Result<()> {
        for (name, fov) in [
            ("horizontal_fov_deg", self.horizontal_fov_deg),
            ("vertical_fov_deg", self.vertical_fov_deg),
        ] {
            if !fov.is_finite() || fov <= 0.0 || fov >= 180.0 {
                return Err(FusionError::InvalidProfile(format!(
                    "{name} must be in (0, 180), got {fov}"
                )));
            }
        }

        let depths = [self.min_depth, self.ideal_depth_lo, self.ideal_depth_hi, self.max_depth];
        if depths.iter().any(|d| !d.is_finite()) || self.min_depth < 0.0 {
            return Err(FusionError::InvalidProfile(format!(
                "depths must be finite and non-negative, got {depths:?}"
            )));
        }
        if !(self.min_depth < self.ideal_depth_lo
            && self.ideal_depth_lo <= self.ideal_depth_hi
            && self.ideal_depth_hi < self.max_depth)
        {
            return Err(FusionError::InvalidProfile(format!(
                "depth bands must satisfy min < ideal_lo <= ideal_hi < max, got {depths:?}"
            )));
        }
        Ok(())
    }

    /// Middle of the ideal depth band
    pub fn ideal_depth(&self) -> f32 {
        0.5 * (self.ideal_depth_lo + self.ideal_depth_hi)
    }

    pub fn half_horizontal_fov_rad(&self) -> f32 {
        (self.horizontal_fov_deg * 0.5).to_radians()
    }

    pub fn half_vertical_fov_rad(&self) -> f32 {
        (self.vertical_fov_deg * 0.5).to_radians()
    }
}

/// Device profiles keyed by family.
///
/// Deserialized entries override the factory profiles; families not
/// mentioned keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<DeviceFamily, DeviceProfile>",
    into = "BTreeMap<DeviceFamily, DeviceProfile>"
)]
pub struct DeviceTable(BTreeMap<DeviceFamily, DeviceProfile>);

impl From<BTreeMap<DeviceFamily, DeviceProfile>> for DeviceTable {
    fn from(overrides: BTreeMap<DeviceFamily, DeviceProfile>) -> Self {
        let mut table = Self::default();
        table.0.extend(overrides);
        table
    }
}

impl From<DeviceTable> for BTreeMap<DeviceFamily, DeviceProfile> {
    fn from(table: DeviceTable) -> Self {
        table.0
    }
}

impl DeviceTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, family: DeviceFamily) -> Result<DeviceProfile> {
        self.0
            .get(&family)
            .copied()
            .ok_or(FusionError::UnknownDevice(family))
    }

    pub fn insert(&mut self, family: DeviceFamily, profile: DeviceProfile) {
        self.0.insert(family, profile);
    }

    pub fn validate(&self) -> Result<()> {
        for (family, profile) in &self.0 {
            profile.validate().map_err(|e| {
                FusionError::InvalidProfile(format!("{}: {e}", family.as_str()))
            })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self(
            DeviceFamily::ALL
                .into_iter()
                .map(|f| (f, f.default_profile()))
                .collect(),
        )
    }
}
