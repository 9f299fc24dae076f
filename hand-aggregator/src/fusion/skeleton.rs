//! Skeleton reconstruction from fused joint positions
//!
//! Each finger is a chain of four bones. A bone's rotation is its parent's
//! rotation turned by the shortest arc that carries the parent's forward
//! axis (+Z) onto the bone direction. The palm rotation parents every
//! metacarpal.

use std::f32::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;

use crate::geometry::EPSILON;
use crate::hand::{
    palm_direction_from_rotation, palm_normal_from_rotation, Chirality, BONES_PER_FINGER,
    FINGER_CHAINS, FINGER_COUNT, WRIST,
};

use super::merger::FusedHand;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bone {
    pub prev_joint: Vector3<f32>,
    pub next_joint: Vector3<f32>,
    pub center: Vector3<f32>,
    /// Unit vector prev → next, zero for a collapsed bone
    pub direction: Vector3<f32>,
    pub length: f32,
    pub rotation: UnitQuaternion<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Finger {
    /// Metacarpal, proximal, intermediate, distal
    pub bones: [Bone; BONES_PER_FINGER],
}

impl Finger {
    pub fn tip(&self) -> Vector3<f32> {
        self.bones[BONES_PER_FINGER - 1].next_joint
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandSkeleton {
    pub chirality: Chirality,
    pub palm_position: Vector3<f32>,
    pub palm_rotation: UnitQuaternion<f32>,
    pub palm_normal: Vector3<f32>,
    pub palm_direction: Vector3<f32>,
    pub wrist_position: Vector3<f32>,
    /// Thumb, index, middle, ring, pinky
    pub fingers: [Finger; FINGER_COUNT],
}

/// Rebuilds bone frames from a fused hand
#[derive(Debug, Clone, Copy)]
pub struct SkeletonReconstructor {
    min_bone_length: f32,
}

impl Default for SkeletonReconstructor {
    fn default() -> Self {
        Self {
            min_bone_length: EPSILON,
        }
    }
}

impl SkeletonReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconstruct(&self, hand: &FusedHand) -> HandSkeleton {
        let fingers = FINGER_CHAINS.map(|chain| {
            let mut parent = hand.palm_rotation;
            let mut prev = hand.joints[WRIST];
            let bones = chain.map(|joint| {
                let next = hand.joints[joint];
                let bone = self.bone(prev, next, &parent);
                parent = bone.rotation;
                prev = next;
                bone
            });
            Finger { bones }
        });

        HandSkeleton {
            chirality: hand.chirality,
            palm_position: hand.palm_position,
            palm_rotation: hand.palm_rotation,
            palm_normal: palm_normal_from_rotation(&hand.palm_rotation),
            palm_direction: palm_direction_from_rotation(&hand.palm_rotation),
            wrist_position: hand.joints[WRIST],
            fingers,
        }
    }

    fn bone(&self, prev: Vector3<f32>, next: Vector3<f32>, parent: &UnitQuaternion<f32>) -> Bone {
        let delta = next - prev;
        let length = delta.norm();
        let center = (prev + next) * 0.5;

        if length < self.min_bone_length {
            return Bone {
                prev_joint: prev,
                next_joint: next,
                center,
                direction: Vector3::zeros(),
                length,
                rotation: *parent,
            };
        }

        let direction = delta / length;
        let forward = parent * Vector3::z();
        // Opposite vectors have no unique shortest arc: flip about the parent's lateral axis
        let turn = UnitQuaternion::rotation_between(&forward, &direction)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&(parent * Vector3::x_axis()), PI));

        Bone {
            prev_joint: prev,
            next_joint: next,
            center,
            direction,
            length,
            rotation: turn * parent,
        }
    }
}
