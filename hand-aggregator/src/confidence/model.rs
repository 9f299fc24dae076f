//! Combined per-source confidence
//!
//! Hand-level confidence is a weighted sum of four independent signals.
//! Per-joint confidence starts from the enabled joint signals (uniform 1
//! when none are enabled) and is then scaled by the hand confidence, so a
//! badly tracked hand cannot win a joint just because that joint looks
//! locally clear.

use serde::Serialize;

use crate::config::{FusionConfig, HandWeights, JointWeights};
use crate::hand::{HandSample, JOINT_COUNT};
use crate::history::HistoryBuffer;
use crate::source::SourceContext;

use super::bone_view::bone_view_confidence;
use super::positional::positional_confidence;
use super::rotational::rotational_confidence;
use super::velocity::velocity_confidence;
use super::visibility::duration_confidence;

/// Confidence of one source for one hand on one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceVector {
    pub hand_confidence: f32,
    pub joint_confidence: [f32; JOINT_COUNT],
}

impl ConfidenceVector {
    /// Full confidence everywhere
    pub fn full() -> Self {
        Self {
            hand_confidence: 1.0,
            joint_confidence: [1.0; JOINT_COUNT],
        }
    }

    pub fn zero() -> Self {
        Self {
            hand_confidence: 0.0,
            joint_confidence: [0.0; JOINT_COUNT],
        }
    }
}

/// Raw hand-level signals before weighting
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SignalBreakdown {
    pub positional: f32,
    pub rotational: f32,
    pub velocity: f32,
    pub visibility_duration: f32,
}

impl SignalBreakdown {
    pub fn weighted(&self, weights: &HandWeights) -> f32 {
        self.positional * weights.positional
            + self.rotational * weights.rotational
            + self.velocity * weights.velocity
            + self.visibility_duration * weights.visibility_duration
    }
}

/// Everything the model needs about one observation
pub struct Observation<'a> {
    pub sample: &'a HandSample,
    pub context: &'a SourceContext,
    pub history: &'a HistoryBuffer,
    /// Seconds this hand has been continuously visible from this source
    pub visible_for: f64,
    /// Per-joint visibility ratios from the occlusion pass, if any
    pub occlusion: Option<&'a [f32; JOINT_COUNT]>,
}

/// Confidence heuristics configured from [`FusionConfig`]
#[derive(Debug, Clone)]
pub struct ConfidenceModel {
    hand_weights: HandWeights,
    joint_weights: JointWeights,
    speed_threshold: f32,
    stale_after_secs: f64,
    visibility_ramp_secs: f64,
}

impl ConfidenceModel {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            hand_weights: config.hand_weights,
            joint_weights: config.joint_weights,
            speed_threshold: config.speed_threshold,
            stale_after_secs: config.stale_after_secs(),
            visibility_ramp_secs: config.visibility_ramp_secs,
        }
    }

    /// Whether any joint signal needs the occlusion collaborator
    pub fn uses_occlusion(&self) -> bool {
        self.joint_weights.occlusion > 0.0
    }

    /// The four raw hand-level signals at tick time `now`
    pub fn hand_signals(&self, obs: &Observation<'_>, now: f64) -> SignalBreakdown {
        let sample = obs.sample;
        SignalBreakdown {
            positional: positional_confidence(&sample.palm_position, obs.context),
            rotational: rotational_confidence(
                &sample.palm_position,
                &sample.palm_normal,
                &obs.context.origin.position,
            ),
            velocity: velocity_confidence(
                obs.history,
                now,
                self.stale_after_secs,
                self.speed_threshold,
            ),
            visibility_duration: duration_confidence(obs.visible_for, self.visibility_ramp_secs),
        }
    }

    /// Joint signals before hand confidence is applied
    pub fn joint_signals(&self, obs: &Observation<'_>) -> [f32; JOINT_COUNT] {
        let weights = &self.joint_weights;
        if weights.is_uniform() {
            return [1.0; JOINT_COUNT];
        }

        let mut out = [0.0; JOINT_COUNT];
        if weights.occlusion > 0.0 {
            // No pass this tick counts as fully visible rather than hidden
            let ratios = obs.occlusion.copied().unwrap_or([1.0; JOINT_COUNT]);
            for (o, r) in out.iter_mut().zip(ratios.iter()) {
                *o += weights.occlusion * r.clamp(0.0, 1.0);
            }
        }
        if weights.bone_view > 0.0 {
            let view = bone_view_confidence(&obs.sample.joints, &obs.context.origin.position);
            for (o, v) in out.iter_mut().zip(view.iter()) {
                *o += weights.bone_view * v;
            }
        }
        out
    }

    /// Full confidence vector plus the signal breakdown that produced it
    pub fn evaluate(&self, obs: &Observation<'_>, now: f64) -> (ConfidenceVector, SignalBreakdown) {
        let signals = self.hand_signals(obs, now);
        let hand_confidence = signals.weighted(&self.hand_weights).max(0.0);

        let mut joint_confidence = self.joint_signals(obs);
        for c in joint_confidence.iter_mut() {
            *c = (*c * hand_confidence).max(0.0);
        }

        (
            ConfidenceVector {
                hand_confidence,
                joint_confidence,
            },
            signals,
        )
    }
}
