//! Aggregation engine - one fused frame per tick
//!
//! Per tick: collect at most one sample per (source, hand), update history
//! and visibility tracking, refresh occlusion ratios within budget, score
//! every observation, normalize per hand, merge, rebuild the skeleton.

use tracing::{debug, trace, warn};

use crate::config::FusionConfig;
use crate::confidence::{
    normalize_confidences, ConfidenceModel, ConfidenceVector, JointVisibility, Observation,
    VisibilityTracker,
};
use crate::error::{FusionError, Result};
use crate::hand::{Chirality, HandSample, JOINT_COUNT};
use crate::history::HistoryBuffer;
use crate::source::{HandSource, SourceContext, SourceId};

use super::frame::{
    ChiralityReport, FusedFrame, FusedFrameConsumer, FusedHandFrame, SourceContribution, TickReport,
};
use super::merger::{merge_hands, FusedHand};
use super::skeleton::SkeletonReconstructor;
use super::smoothing::PalmSmoother;

/// This tick's samples, indexed by source then [`Chirality::index`]
type TickInput = Vec<[Option<HandSample>; 2]>;

/// Per (source, hand) state kept between ticks
#[derive(Debug, Default)]
struct SourceTrack {
    /// Created on first observation
    history: Option<HistoryBuffer>,
    visibility: VisibilityTracker,
    occlusion: Option<[f32; JOINT_COUNT]>,
}

impl SourceTrack {
    /// Record a sighting; returns seconds of continuous visibility
    fn observe(&mut self, sample: &HandSample, now: f64, capacity: usize) -> f64 {
        self.history
            .get_or_insert_with(|| HistoryBuffer::with_capacity(capacity))
            .add(sample.palm_position, now);
        self.visibility.observe(now)
    }

    /// History is kept across gaps; visibility and occlusion are not
    fn lose(&mut self) {
        self.visibility.lose();
        self.occlusion = None;
    }
}

struct SourceSlot {
    name: String,
    context: SourceContext,
    /// `None` for push-driven sources fed through [`AggregationEngine::fuse`]
    driver: Option<Box<dyn HandSource>>,
    tracks: [SourceTrack; 2],
}

/// Multi-source hand fusion engine
pub struct AggregationEngine {
    config: FusionConfig,
    model: ConfidenceModel,
    reconstructor: SkeletonReconstructor,
    sources: Vec<SourceSlot>,
    visibility: Option<Box<dyn JointVisibility>>,
    smoothers: [Option<PalmSmoother>; 2],
    ticks: u64,
    occlusion_cursor: usize,
    last_report: TickReport,
}

impl AggregationEngine {
    pub fn new(config: FusionConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            rotation_blend = ?config.rotation_blend,
            smoothing = config.smoothing.is_some(),
            devices = config.devices.len(),
            "aggregation engine configured"
        );
        Ok(Self {
            model: ConfidenceModel::new(&config),
            reconstructor: SkeletonReconstructor::new(),
            config,
            sources: Vec::new(),
            visibility: None,
            smoothers: [None, None],
            ticks: 0,
            occlusion_cursor: 0,
            last_report: TickReport::default(),
        })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Attach the occlusion collaborator
    pub fn set_visibility(&mut self, visibility: Box<dyn JointVisibility>) {
        self.visibility = Some(visibility);
    }

    pub fn with_visibility(mut self, visibility: Box<dyn JointVisibility>) -> Self {
        self.set_visibility(visibility);
        self
    }

    /// Register a polled source. Its context is read once, here.
    pub fn register(&mut self, source: Box<dyn HandSource>) -> Result<SourceId> {
        let context = source.context();
        let name = source.name().to_string();
        self.add_slot(name, context, Some(source))
    }

    /// Register a push-driven source known only by its context
    pub fn register_context(&mut self, context: SourceContext) -> Result<SourceId> {
        let name = SourceId(self.sources.len()).to_string();
        self.add_slot(name, context, None)
    }

    fn add_slot(
        &mut self,
        name: String,
        context: SourceContext,
        driver: Option<Box<dyn HandSource>>,
    ) -> Result<SourceId> {
        if let Err(e) = context.profile.validate() {
            warn!(name = %name, error = %e, "rejected source");
            return Err(e);
        }

        let id = SourceId(self.sources.len());
        debug!(
            source = %id,
            name = %name,
            position = ?context.origin.position,
            polled = driver.is_some(),
            "registered source"
        );
        self.sources.push(SourceSlot {
            name,
            context,
            driver,
            tracks: Default::default(),
        });
        Ok(id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn source_context(&self, id: SourceId) -> Option<&SourceContext> {
        self.sources.get(id.index()).map(|s| &s.context)
    }

    pub fn source_name(&self, id: SourceId) -> Option<&str> {
        self.sources.get(id.index()).map(|s| s.name.as_str())
    }

    /// Diagnostics for the most recent tick
    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Poll every registered source and fuse
    pub fn tick(&mut self, timestamp: f64) -> FusedFrame {
        let mut input: TickInput = Vec::with_capacity(self.sources.len());
        for slot in &mut self.sources {
            let name = &slot.name;
            let polled = match slot.driver.as_mut() {
                Some(driver) => Chirality::BOTH.map(|chirality| {
                    driver.poll(chirality).filter(|sample| {
                        let matches = sample.chirality == chirality;
                        if !matches {
                            warn!(source = %name, asked = chirality.as_str(), "source returned the other hand, ignoring");
                        }
                        matches
                    })
                }),
                None => [None, None],
            };
            input.push(polled);
        }
        self.step(timestamp, input)
    }

    /// [`tick`](Self::tick) and hand the frame to `consumer`
    pub fn tick_into<C>(&mut self, timestamp: f64, consumer: &mut C) -> FusedFrame
    where
        C: FusedFrameConsumer + ?Sized,
    {
        let frame = self.tick(timestamp);
        consumer.on_fused_frame(&frame);
        frame
    }

    /// Fuse externally supplied observations. Sources not mentioned are
    /// treated as not seeing either hand; a repeated (source, hand) keeps
    /// the last sample.
    pub fn fuse(&mut self, timestamp: f64, observations: &[(SourceId, HandSample)]) -> Result<FusedFrame> {
        let mut input: TickInput = vec![[None, None]; self.sources.len()];
        for (id, sample) in observations {
            let slot = input
                .get_mut(id.index())
                .ok_or(FusionError::UnknownSource(id.index()))?;
            slot[sample.chirality.index()] = Some(sample.clone());
        }
        Ok(self.step(timestamp, input))
    }

    fn step(&mut self, timestamp: f64, input: TickInput) -> FusedFrame {
        self.ticks += 1;
        let capacity = self.config.history_capacity;

        let mut visible_for = vec![[0.0f64; 2]; self.sources.len()];
        for ((slot, observed), durations) in self.sources.iter_mut().zip(&input).zip(&mut visible_for) {
            for chirality in Chirality::BOTH {
                let c = chirality.index();
                let track = &mut slot.tracks[c];
                match &observed[c] {
                    Some(sample) => durations[c] = track.observe(sample, timestamp, capacity),
                    None => track.lose(),
                }
            }
        }

        let occlusion_refreshed = self.refresh_occlusion(&input);

        let mut frame = FusedFrame::empty(timestamp);
        let mut hands = Vec::with_capacity(2);
        for chirality in Chirality::BOTH {
            if let Some(report) = self.fuse_hand(chirality, timestamp, &input, &visible_for, &mut frame) {
                hands.push(report);
            }
        }

        trace!(
            tick = self.ticks,
            timestamp,
            hands = frame.hands.len(),
            refreshed = occlusion_refreshed.len(),
            "tick fused"
        );
        self.last_report = TickReport {
            tick: self.ticks,
            timestamp,
            hands,
            occlusion_refreshed,
        };
        frame
    }

    /// Re-render occlusion for up to `max_sources_per_tick` observing
    /// sources, round-robin, every `refresh_interval_ticks` ticks
    fn refresh_occlusion(&mut self, input: &[[Option<HandSample>; 2]]) -> Vec<SourceId> {
        if !self.model.uses_occlusion() {
            return Vec::new();
        }
        let Some(visibility) = self.visibility.as_mut() else {
            return Vec::new();
        };
        let budget = self.config.occlusion;
        if (self.ticks - 1) % u64::from(budget.refresh_interval_ticks) != 0 {
            return Vec::new();
        }

        let observing: Vec<usize> = input
            .iter()
            .enumerate()
            .filter(|(_, hands)| hands.iter().any(Option::is_some))
            .map(|(index, _)| index)
            .collect();
        if observing.is_empty() {
            return Vec::new();
        }

        let start = observing
            .iter()
            .position(|&index| index >= self.occlusion_cursor)
            .unwrap_or(0);
        let count = budget.max_sources_per_tick.min(observing.len());

        let mut refreshed = Vec::with_capacity(count);
        for k in 0..count {
            let index = observing[(start + k) % observing.len()];
            let slot = &mut self.sources[index];
            for chirality in Chirality::BOTH {
                let c = chirality.index();
                let Some(sample) = &input[index][c] else {
                    continue;
                };
                // No pass this time keeps whatever was cached
                if let Some(ratios) = visibility.visibility_ratios(&slot.context.origin, sample) {
                    slot.tracks[c].occlusion = Some(ratios);
                }
            }
            refreshed.push(SourceId(index));
            self.occlusion_cursor = index + 1;
        }
        refreshed
    }

    fn fuse_hand(
        &mut self,
        chirality: Chirality,
        timestamp: f64,
        input: &[[Option<HandSample>; 2]],
        visible_for: &[[f64; 2]],
        frame: &mut FusedFrame,
    ) -> Option<ChiralityReport> {
        let c = chirality.index();

        let mut ids = Vec::new();
        let mut samples = Vec::new();
        let mut confidences = Vec::new();
        let mut signals = Vec::new();
        for (index, (slot, observed)) in self.sources.iter().zip(input).enumerate() {
            let Some(sample) = &observed[c] else {
                continue;
            };
            let track = &slot.tracks[c];
            let Some(history) = track.history.as_ref() else {
                continue;
            };
            let obs = Observation {
                sample,
                context: &slot.context,
                history,
                visible_for: visible_for[index][c],
                occlusion: track.occlusion.as_ref(),
            };
            let (vector, breakdown) = self.model.evaluate(&obs, timestamp);
            ids.push(SourceId(index));
            samples.push(sample.clone());
            confidences.push(vector);
            signals.push(breakdown);
        }

        if samples.is_empty() {
            self.smoothers[c] = None;
            return None;
        }

        let raw: Vec<f32> = confidences.iter().map(|v| v.hand_confidence).collect();
        let merged = if raw.iter().all(|c| *c == 0.0) {
            None
        } else if samples.len() == 1 {
            // A lone observer with any confidence at all is trusted outright
            confidences[0] = ConfidenceVector::full();
            Some(FusedHand::from_sample(&samples[0]))
        } else {
            normalize_confidences(&mut confidences);
            merge_hands(&samples, &confidences, self.config.rotation_blend)
        };

        let contributions = ids
            .iter()
            .zip(&signals)
            .zip(&raw)
            .zip(&confidences)
            .map(|(((source, signals), raw), weight)| SourceContribution {
                source: *source,
                signals: *signals,
                raw_confidence: *raw,
                weight: weight.hand_confidence,
            })
            .collect();

        let Some(mut hand) = merged else {
            warn!(
                hand = chirality.as_str(),
                sources = samples.len(),
                "every source has zero confidence, skipping hand"
            );
            self.smoothers[c] = None;
            return Some(ChiralityReport {
                chirality,
                contributions,
                fused: false,
            });
        };

        if let Some(settings) = self.config.smoothing {
            let smoother = self.smoothers[c].get_or_insert_with(|| PalmSmoother::new(&settings));
            let smoothed = smoother.filter(timestamp, hand.palm_position);
            // Move the whole hand so joints stay attached to the palm
            let shift = smoothed - hand.palm_position;
            hand.palm_position = smoothed;
            for joint in hand.joints.iter_mut() {
                *joint += shift;
            }
        }

        let skeleton = self.reconstructor.reconstruct(&hand);
        frame.hands.push(FusedHandFrame {
            hand,
            skeleton,
            source_count: samples.len(),
        });
        Some(ChiralityReport {
            chirality,
            contributions,
            fused: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmoothingConfig;
    use crate::device::DeviceFamily;
    use crate::hand::{Pose, INDEX_TIP};
    use nalgebra::{UnitQuaternion, Vector3};
    use std::cell::{Cell, RefCell};
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    const DT: f64 = 1.0 / 60.0;

    /// Sensor at `x` on the floor looking up (+Y)
    fn upward_sensor(x: f32) -> SourceContext {
        let origin = Pose::new(
            Vector3::new(x, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2),
        );
        SourceContext::new(origin, DeviceFamily::LeapMotionController.default_profile())
    }

    fn palm_down(chirality: Chirality, position: Vector3<f32>) -> HandSample {
        let mut joints = [position; JOINT_COUNT];
        joints[INDEX_TIP] = position + Vector3::new(0.0, 0.0, 0.08);
        HandSample::new(chirality, position, UnitQuaternion::identity(), joints, 0.0)
    }

    struct StaticSource {
        context: SourceContext,
        left: Option<HandSample>,
    }

    impl HandSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn context(&self) -> SourceContext {
            self.context
        }

        fn poll(&mut self, chirality: Chirality) -> Option<HandSample> {
            match chirality {
                Chirality::Left => self.left.clone(),
                Chirality::Right => None,
            }
        }
    }

    #[test]
    fn single_source_is_bit_stable() {
        let sample = palm_down(Chirality::Left, Vector3::new(0.01, 0.24, -0.02));
        let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
        engine
            .register(Box::new(StaticSource {
                context: upward_sensor(0.0),
                left: Some(sample.clone()),
            }))
            .unwrap();

        let first = engine.tick(0.0);
        for i in 1..8 {
            let frame = engine.tick(i as f64 * DT);
            let hand = &frame.left().unwrap().hand;
            assert_eq!(hand, &first.left().unwrap().hand);
            assert_eq!(hand.palm_position, sample.palm_position);
            assert_eq!(hand.joints, sample.joints);
            assert!(frame.right().is_none());
        }
        let report = engine.last_report().hand(Chirality::Left).unwrap();
        assert_eq!(report.contributions[0].weight, 1.0);
    }

    #[test]
    fn two_sources_blend_by_confidence() {
        let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
        let near = engine.register_context(upward_sensor(0.0)).unwrap();
        let far = engine.register_context(upward_sensor(0.2)).unwrap();

        let a = palm_down(Chirality::Right, Vector3::new(0.0, 0.25, 0.0));
        let b = palm_down(Chirality::Right, Vector3::new(0.01, 0.25, 0.0));
        let frame = engine.fuse(0.0, &[(near, a.clone()), (far, b.clone())]).unwrap();

        let fused = &frame.right().unwrap();
        assert_eq!(fused.source_count, 2);
        // The near sensor sees the hand on-axis and should dominate
        let x = fused.hand.palm_position.x;
        assert!(x > 0.0 && x < 0.005, "x = {x}");

        let report = engine.last_report().hand(Chirality::Right).unwrap();
        let total: f32 = report.contributions.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(report.contributions[0].weight > report.contributions[1].weight);
    }

    #[test]
    fn gap_restarts_visibility_ramp() {
        let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
        let id = engine.register_context(upward_sensor(0.0)).unwrap();
        let sample = palm_down(Chirality::Left, Vector3::new(0.0, 0.25, 0.0));

        engine.fuse(0.0, &[(id, sample.clone())]).unwrap();
        engine.fuse(0.5, &[(id, sample.clone())]).unwrap();
        let duration = |engine: &AggregationEngine| {
            engine.last_report().hand(Chirality::Left).unwrap().contributions[0]
                .signals
                .visibility_duration
        };
        assert!((duration(&engine) - 0.5).abs() < 1e-5);

        let frame = engine.fuse(0.6, &[]).unwrap();
        assert!(frame.is_empty());
        assert!(engine.last_report().hands.is_empty());

        engine.fuse(0.7, &[(id, sample)]).unwrap();
        assert_eq!(duration(&engine), 0.0);
    }

    #[test]
    fn zero_confidence_everywhere_skips_hand() {
        let mut config = FusionConfig::default();
        config.hand_weights.rotational = 0.0;
        config.hand_weights.velocity = 0.0;
        config.hand_weights.visibility_duration = 0.0;
        let mut engine = AggregationEngine::new(config).unwrap();
        let a = engine.register_context(upward_sensor(0.0)).unwrap();
        let b = engine.register_context(upward_sensor(0.3)).unwrap();

        // Below both sensors: positional confidence is zero
        let hidden = palm_down(Chirality::Left, Vector3::new(0.1, -0.2, 0.0));
        let frame = engine.fuse(0.0, &[(a, hidden.clone()), (b, hidden)]).unwrap();
        assert!(frame.left().is_none());
        let report = engine.last_report().hand(Chirality::Left).unwrap();
        assert!(!report.fused);
        assert!(report.contributions.iter().all(|c| c.weight == 0.0));
    }

    #[test]
    fn lone_zero_confidence_source_is_not_fused() {
        let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
        let id = engine.register_context(upward_sensor(0.0)).unwrap();

        // Below the sensor with the palm seen edge-on; first sighting, so
        // velocity and visibility duration are zero too
        let palm = Vector3::new(0.0, -0.2, 0.0);
        let edge_on = HandSample::new(
            Chirality::Right,
            palm,
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
            [palm; JOINT_COUNT],
            0.0,
        );
        let frame = engine.fuse(0.0, &[(id, edge_on)]).unwrap();
        assert!(frame.right().is_none());

        let report = engine.last_report().hand(Chirality::Right).unwrap();
        assert!(!report.fused);
        assert_eq!(report.contributions[0].raw_confidence, 0.0);
        assert_eq!(report.contributions[0].weight, 0.0);
    }

    #[test]
    fn velocity_fails_closed_after_a_gap() {
        let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
        let id = engine.register_context(upward_sensor(0.0)).unwrap();
        let velocity = |engine: &AggregationEngine| {
            engine.last_report().hand(Chirality::Left).unwrap().contributions[0]
                .signals
                .velocity
        };

        let resting = palm_down(Chirality::Left, Vector3::new(0.0, 0.25, 0.0));
        for i in 0..3 {
            engine.fuse(i as f64 * DT, &[(id, resting.clone())]).unwrap();
        }
        assert!(velocity(&engine) > 0.99);
        for i in 3..10 {
            engine.fuse(i as f64 * DT, &[]).unwrap();
        }

        // Back five seconds later, 0.3 m away
        let moved = palm_down(Chirality::Left, Vector3::new(0.3, 0.25, 0.0));
        engine.fuse(5.0, &[(id, moved.clone())]).unwrap();
        assert_eq!(velocity(&engine), 0.0);

        engine.fuse(5.0 + DT, &[(id, moved)]).unwrap();
        assert!(velocity(&engine) > 0.99);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
        let sample = palm_down(Chirality::Left, Vector3::new(0.0, 0.25, 0.0));
        let err = engine.fuse(0.0, &[(SourceId(3), sample)]).unwrap_err();
        assert!(matches!(err, FusionError::UnknownSource(3)));
    }

    #[test]
    fn invalid_profile_is_rejected_at_registration() {
        let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
        let mut context = upward_sensor(0.0);
        context.profile.horizontal_fov_deg = 200.0;
        assert!(engine.register_context(context).is_err());
        assert_eq!(engine.source_count(), 0);
    }

    struct CountingVisibility {
        calls: Rc<Cell<usize>>,
        viewpoints: Rc<RefCell<Vec<f32>>>,
    }

    impl JointVisibility for CountingVisibility {
        fn visibility_ratios(&mut self, viewpoint: &Pose, _sample: &HandSample) -> Option<[f32; JOINT_COUNT]> {
            self.calls.set(self.calls.get() + 1);
            self.viewpoints.borrow_mut().push(viewpoint.position.x);
            let mut ratios = [1.0; JOINT_COUNT];
            ratios[INDEX_TIP] = 0.0;
            Some(ratios)
        }
    }

    #[test]
    fn occlusion_refresh_is_round_robin_and_budgeted() {
        let mut config = FusionConfig::default();
        config.joint_weights.occlusion = 1.0;
        config.occlusion.max_sources_per_tick = 2;
        config.occlusion.refresh_interval_ticks = 1;

        let calls = Rc::new(Cell::new(0));
        let viewpoints = Rc::new(RefCell::new(Vec::new()));
        let mut engine = AggregationEngine::new(config)
            .unwrap()
            .with_visibility(Box::new(CountingVisibility {
                calls: calls.clone(),
                viewpoints: viewpoints.clone(),
            }));
        let ids: Vec<SourceId> = (0..3)
            .map(|i| engine.register_context(upward_sensor(i as f32 * 0.05)).unwrap())
            .collect();
        let sample = palm_down(Chirality::Left, Vector3::new(0.05, 0.25, 0.0));
        let observations: Vec<(SourceId, HandSample)> =
            ids.iter().map(|id| (*id, sample.clone())).collect();

        engine.fuse(0.0, &observations).unwrap();
        assert_eq!(engine.last_report().occlusion_refreshed, vec![SourceId(0), SourceId(1)]);
        engine.fuse(DT, &observations).unwrap();
        assert_eq!(engine.last_report().occlusion_refreshed, vec![SourceId(2), SourceId(0)]);
        engine.fuse(2.0 * DT, &observations).unwrap();
        assert_eq!(engine.last_report().occlusion_refreshed, vec![SourceId(1), SourceId(2)]);
        assert_eq!(calls.get(), 6);
        assert_eq!(viewpoints.borrow().len(), 6);
    }

    #[test]
    fn occlusion_is_amortized_between_refreshes() {
        let mut config = FusionConfig::default();
        config.joint_weights.occlusion = 1.0;
        config.occlusion.refresh_interval_ticks = 3;

        let calls = Rc::new(Cell::new(0));
        let mut engine = AggregationEngine::new(config)
            .unwrap()
            .with_visibility(Box::new(CountingVisibility {
                calls: calls.clone(),
                viewpoints: Rc::new(RefCell::new(Vec::new())),
            }));
        let id = engine.register_context(upward_sensor(0.0)).unwrap();
        let sample = palm_down(Chirality::Left, Vector3::new(0.0, 0.25, 0.0));
        for i in 0..6 {
            engine.fuse(i as f64 * DT, &[(id, sample.clone())]).unwrap();
        }
        // Ticks 1 and 4
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn consumer_receives_every_frame() {
        let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
        engine
            .register(Box::new(StaticSource {
                context: upward_sensor(0.0),
                left: Some(palm_down(Chirality::Left, Vector3::new(0.0, 0.25, 0.0))),
            }))
            .unwrap();

        let mut received = Vec::new();
        let mut consumer = |frame: &FusedFrame| received.push(frame.hands.len());
        for i in 0..3 {
            engine.tick_into(i as f64 * DT, &mut consumer);
        }
        assert_eq!(received, vec![1, 1, 1]);
    }

    #[test]
    fn smoothing_damps_jumps_and_resets_on_loss() {
        let mut config = FusionConfig::default();
        config.smoothing = Some(SmoothingConfig::default());
        let mut engine = AggregationEngine::new(config).unwrap();
        let id = engine.register_context(upward_sensor(0.0)).unwrap();

        let start = palm_down(Chirality::Left, Vector3::new(0.0, 0.25, 0.0));
        let moved = palm_down(Chirality::Left, Vector3::new(0.05, 0.25, 0.0));
        engine.fuse(0.0, &[(id, start)]).unwrap();
        let frame = engine.fuse(DT, &[(id, moved.clone())]).unwrap();
        let hand = &frame.left().unwrap().hand;
        assert!(hand.palm_position.x > 0.0 && hand.palm_position.x < 0.05);
        // Joints travel with the palm
        let offset = hand.joints[INDEX_TIP] - hand.palm_position;
        assert!((offset - Vector3::new(0.0, 0.0, 0.08)).norm() < 1e-6);

        engine.fuse(2.0 * DT, &[]).unwrap();
        let frame = engine.fuse(3.0 * DT, &[(id, moved.clone())]).unwrap();
        assert_eq!(frame.left().unwrap().hand.palm_position, moved.palm_position);
    }
}
