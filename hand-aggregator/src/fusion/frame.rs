//! Engine output: fused frames, the consumer hook and per-tick diagnostics

use serde::Serialize;

use crate::confidence::SignalBreakdown;
use crate::hand::{Chirality, Pose, FLAT_POSE_LEN, JOINT_COUNT};
use crate::source::SourceId;

use super::merger::FusedHand;
use super::skeleton::HandSkeleton;

/// One fused hand with its reconstructed skeleton
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedHandFrame {
    pub hand: FusedHand,
    pub skeleton: HandSkeleton,
    /// Number of sources that observed this hand on this tick
    pub source_count: usize,
}

/// Floats per hand in [`FusedFrame::to_flat`]:
/// `[is_right, source_count, palm pose (7), joints (22 * 3)]`
pub const FLAT_HAND_LEN: usize = 2 + FLAT_POSE_LEN + JOINT_COUNT * 3;

/// Everything fused on one tick; at most one hand per chirality
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FusedFrame {
    pub timestamp: f64,
    pub hands: Vec<FusedHandFrame>,
}

impl FusedFrame {
    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            hands: Vec::new(),
        }
    }

    pub fn hand(&self, chirality: Chirality) -> Option<&FusedHandFrame> {
        self.hands.iter().find(|h| h.hand.chirality == chirality)
    }

    pub fn left(&self) -> Option<&FusedHandFrame> {
        self.hand(Chirality::Left)
    }

    pub fn right(&self) -> Option<&FusedHandFrame> {
        self.hand(Chirality::Right)
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// Pack every hand into one flat buffer, [`FLAT_HAND_LEN`] floats each
    pub fn to_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.hands.len() * FLAT_HAND_LEN);
        for fused in &self.hands {
            let hand = &fused.hand;
            out.push(if hand.chirality == Chirality::Right { 1.0 } else { 0.0 });
            out.push(fused.source_count as f32);
            out.extend_from_slice(&Pose::new(hand.palm_position, hand.palm_rotation).to_flat());
            for joint in &hand.joints {
                out.extend_from_slice(joint.as_slice());
            }
        }
        out
    }
}

/// Downstream receiver of fused frames
pub trait FusedFrameConsumer {
    fn on_fused_frame(&mut self, frame: &FusedFrame);
}

impl<F: FnMut(&FusedFrame)> FusedFrameConsumer for F {
    fn on_fused_frame(&mut self, frame: &FusedFrame) {
        self(frame)
    }
}

/// How one source contributed to one hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceContribution {
    pub source: SourceId,
    pub signals: SignalBreakdown,
    /// Weighted hand confidence before normalization
    pub raw_confidence: f32,
    /// Share of the fused palm after normalization
    pub weight: f32,
}

/// Diagnostics for one chirality on one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiralityReport {
    pub chirality: Chirality,
    pub contributions: Vec<SourceContribution>,
    /// False when every source had zero confidence
    pub fused: bool,
}

/// Diagnostics for the most recent tick
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub timestamp: f64,
    pub hands: Vec<ChiralityReport>,
    /// Sources whose occlusion ratios were re-rendered this tick
    pub occlusion_refreshed: Vec<SourceId>,
}

impl TickReport {
    pub fn hand(&self, chirality: Chirality) -> Option<&ChiralityReport> {
        self.hands.iter().find(|h| h.chirality == chirality)
    }
}
