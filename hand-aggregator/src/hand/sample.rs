//! Per-source hand observations and rigid poses

use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

use super::joints::{JOINT_COUNT, MIRRORED_WRIST, WRIST};

/// Values in a flat pose: position xyz then quaternion xyzw
pub const FLAT_POSE_LEN: usize = 7;

/// Which hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chirality {
    Left,
    Right,
}

impl Chirality {
    pub const BOTH: [Chirality; 2] = [Chirality::Left, Chirality::Right];

    /// Array slot for per-chirality storage
    pub fn index(self) -> usize {
        match self {
            Chirality::Left => 0,
            Chirality::Right => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Chirality::Left => "left",
            Chirality::Right => "right",
        }
    }
}

/// Rigid transform in the shared world frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Pose {
    pub fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// World point expressed in this pose's local frame
    pub fn inverse_transform_point(&self, world: &Vector3<f32>) -> Vector3<f32> {
        self.rotation.inverse_transform_vector(&(world - self.position))
    }

    /// Local point expressed in world coordinates
    pub fn transform_point(&self, local: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * local + self.position
    }

    pub fn as_point(&self) -> Point3<f32> {
        Point3::from(self.position)
    }

    /// Parse `[x, y, z, qx, qy, qz, qw]`; the quaternion is renormalized
    pub fn from_flat(data: &[f32]) -> Result<Self> {
        let [x, y, z, qx, qy, qz, qw] = data else {
            return Err(FusionError::PoseLength(data.len()));
        };
        let q = Quaternion::new(*qw, *qx, *qy, *qz);
        if q.norm() < f32::EPSILON {
            return Err(FusionError::DegenerateRotation);
        }
        Ok(Self::new(Vector3::new(*x, *y, *z), UnitQuaternion::new_normalize(q)))
    }

    pub fn to_flat(&self) -> [f32; FLAT_POSE_LEN] {
        let q = self.rotation.quaternion();
        [
            self.position.x,
            self.position.y,
            self.position.z,
            q.i,
            q.j,
            q.k,
            q.w,
        ]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Hand-local palm normal. The hand frame is +Z toward the fingers, +Y out of
/// the back of the hand, so the palm faces -Y.
pub fn palm_normal_from_rotation(rotation: &UnitQuaternion<f32>) -> Vector3<f32> {
    rotation * -Vector3::y()
}

/// Hand-local pointing direction (wrist toward fingers)
pub fn palm_direction_from_rotation(rotation: &UnitQuaternion<f32>) -> Vector3<f32> {
    rotation * Vector3::z()
}

/// One hand as seen by one source on one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSample {
    pub chirality: Chirality,
    pub palm_position: Vector3<f32>,
    pub palm_rotation: UnitQuaternion<f32>,
    pub palm_normal: Vector3<f32>,
    pub joints: [Vector3<f32>; JOINT_COUNT],
    /// Source capture time in seconds
    pub timestamp: f64,
}

impl HandSample {
    /// Build a sample, deriving the palm normal from the palm rotation and
    /// keeping the mirrored wrist slot in sync with the wrist.
    pub fn new(
        chirality: Chirality,
        palm_position: Vector3<f32>,
        palm_rotation: UnitQuaternion<f32>,
        mut joints: [Vector3<f32>; JOINT_COUNT],
        timestamp: f64,
    ) -> Self {
        joints[MIRRORED_WRIST] = joints[WRIST];
        Self {
            chirality,
            palm_position,
            palm_normal: palm_normal_from_rotation(&palm_rotation),
            palm_rotation,
            joints,
            timestamp,
        }
    }

    pub fn wrist(&self) -> Vector3<f32> {
        self.joints[WRIST]
    }

    pub fn palm_direction(&self) -> Vector3<f32> {
        palm_direction_from_rotation(&self.palm_rotation)
    }

    /// Parse a flat `[x, y, z]` buffer of 21 or 22 joints. The mirrored
    /// wrist may be omitted; [`HandSample::new`] fills it in.
    pub fn joints_from_flat(data: &[f32]) -> Option<[Vector3<f32>; JOINT_COUNT]> {
        if data.len() != JOINT_COUNT * 3 && data.len() != MIRRORED_WRIST * 3 {
            return None;
        }
        let mut joints = [Vector3::zeros(); JOINT_COUNT];
        for (joint, xyz) in joints.iter_mut().zip(data.chunks_exact(3)) {
            *joint = Vector3::new(xyz[0], xyz[1], xyz[2]);
        }
        Some(joints)
    }

    /// Build a sample from a flat palm pose and flat joint buffer
    pub fn from_flat(chirality: Chirality, palm: &[f32], joints: &[f32], timestamp: f64) -> Result<Self> {
        let palm = Pose::from_flat(palm)?;
        let joints = Self::joints_from_flat(joints).ok_or(FusionError::JointCount {
            expected: JOINT_COUNT * 3,
            actual: joints.len(),
        })?;
        Ok(Self::new(chirality, palm.position, palm.rotation, joints, timestamp))
    }
}
