//! End-to-end aggregation through the public API

use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::io::Write;
use std::rc::Rc;

use hand_aggregator::confidence::{joint_id_color, IdPass, PixelBuffer, ProjectedJoint};
use hand_aggregator::hand::{INDEX_TIP, MIRRORED_WRIST, WRIST};
use hand_aggregator::{
    AggregationEngine, Chirality, DeviceFamily, FusedFrame, FusionConfig, HandSample, HandSource,
    IdPassRenderer, IdPassVisibility, Pose, RotationBlend, SourceContext, JOINT_COUNT,
};
use nalgebra::{UnitQuaternion, Vector3};

fn upward_mount(x: f32) -> Pose {
    Pose::new(
        Vector3::new(x, 0.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2),
    )
}

fn context(x: f32) -> SourceContext {
    SourceContext::for_device(upward_mount(x), DeviceFamily::LeapMotionController, &Default::default())
        .unwrap()
}

/// Palm-down hand with fingers spread along +Z
fn hand_at(chirality: Chirality, palm: Vector3<f32>, timestamp: f64) -> HandSample {
    let mut joints = [palm; JOINT_COUNT];
    for (j, joint) in joints.iter_mut().enumerate().take(MIRRORED_WRIST).skip(1) {
        *joint = palm + Vector3::new(0.0, 0.0, 0.01 * j as f32);
    }
    joints[WRIST] = palm - Vector3::new(0.0, 0.0, 0.05);
    HandSample::new(chirality, palm, UnitQuaternion::identity(), joints, timestamp)
}

/// Source whose next sample the test controls
struct ScriptedSource {
    name: String,
    context: SourceContext,
    next: Rc<RefCell<Option<HandSample>>>,
}

impl HandSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn context(&self) -> SourceContext {
        self.context
    }

    fn poll(&mut self, chirality: Chirality) -> Option<HandSample> {
        self.next.borrow().clone().filter(|s| s.chirality == chirality)
    }
}

#[test]
fn polled_sources_track_a_moving_hand() {
    let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
    let mut feeds = Vec::new();
    for (i, x) in [-0.05, 0.05].into_iter().enumerate() {
        let feed = Rc::new(RefCell::new(None));
        engine
            .register(Box::new(ScriptedSource {
                name: format!("leap-{i}"),
                context: context(x),
                next: feed.clone(),
            }))
            .unwrap();
        feeds.push(feed);
    }
    assert_eq!(engine.source_count(), 2);
    assert_eq!(engine.source_name(hand_aggregator::SourceId(1)), Some("leap-1"));

    let mut frames: Vec<FusedFrame> = Vec::new();
    let mut collect = |frame: &FusedFrame| frames.push(frame.clone());
    for tick in 0..30 {
        let t = tick as f64 / 60.0;
        let palm = Vector3::new(0.0, 0.2 + 0.001 * tick as f32, 0.0);
        for feed in &feeds {
            *feed.borrow_mut() = Some(hand_at(Chirality::Left, palm, t));
        }
        engine.tick_into(t, &mut collect);
    }

    assert_eq!(frames.len(), 30);
    for (tick, frame) in frames.iter().enumerate() {
        let left = frame.left().expect("left hand fused every tick");
        assert!(frame.right().is_none());
        assert_eq!(left.source_count, 2);
        // Both sources agree, so the fused palm matches them
        let expected = 0.2 + 0.001 * tick as f32;
        assert!((left.hand.palm_position.y - expected).abs() < 1e-5);
        assert_eq!(left.skeleton.fingers.len(), 5);
    }

    let report = engine.last_report();
    assert_eq!(report.tick, 30);
    let left = report.hand(Chirality::Left).unwrap();
    assert!(left.fused);
    // Moving slowly for half a second: velocity and duration both contribute
    assert!(left.contributions.iter().all(|c| c.signals.velocity > 0.9));
    assert!(left.contributions.iter().all(|c| c.signals.visibility_duration > 0.4));
}

#[test]
fn hand_handed_over_between_sources() {
    let mut engine = AggregationEngine::new(FusionConfig::default()).unwrap();
    let a = engine.register_context(context(0.0)).unwrap();
    let b = engine.register_context(context(0.3)).unwrap();

    let near_a = hand_at(Chirality::Right, Vector3::new(0.0, 0.25, 0.0), 0.0);
    let frame = engine.fuse(0.0, &[(a, near_a.clone())]).unwrap();
    assert_eq!(frame.right().unwrap().hand.joints, near_a.joints);

    let both_a = hand_at(Chirality::Right, Vector3::new(0.15, 0.25, 0.0), 0.1);
    let both_b = hand_at(Chirality::Right, Vector3::new(0.16, 0.25, 0.0), 0.1);
    let frame = engine.fuse(0.1, &[(a, both_a), (b, both_b)]).unwrap();
    let fused = frame.right().unwrap();
    assert_eq!(fused.source_count, 2);
    assert!(fused.hand.palm_position.x > 0.15 && fused.hand.palm_position.x < 0.16);

    let near_b = hand_at(Chirality::Right, Vector3::new(0.3, 0.25, 0.0), 0.2);
    let frame = engine.fuse(0.2, &[(b, near_b.clone())]).unwrap();
    assert_eq!(frame.right().unwrap().hand.palm_position, near_b.palm_position);
}

#[test]
fn config_file_drives_the_engine() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "rotation_blend": "eigen",
            "hand_weights": {{ "velocity": 0.0 }},
            "devices": {{
                "leap2": {{
                    "horizontal_fov_deg": 150.0,
                    "vertical_fov_deg": 150.0,
                    "min_depth": 0.08,
                    "ideal_depth_lo": 0.12,
                    "ideal_depth_hi": 0.4,
                    "max_depth": 0.65
                }}
            }}
        }}"#
    )
    .unwrap();

    let config = FusionConfig::load(file.path()).unwrap();
    assert_eq!(config.rotation_blend, RotationBlend::Eigen);
    let leap2 = config.devices.get(DeviceFamily::Leap2).unwrap();
    assert_eq!(leap2.max_depth, 0.65);

    let mut engine = AggregationEngine::new(config.clone()).unwrap();
    let a = engine
        .register_context(SourceContext::for_device(upward_mount(0.0), DeviceFamily::Leap2, &config.devices).unwrap())
        .unwrap();
    let b = engine
        .register_context(SourceContext::for_device(upward_mount(0.02), DeviceFamily::Leap2, &config.devices).unwrap())
        .unwrap();

    let mut tilted = hand_at(Chirality::Left, Vector3::new(0.01, 0.25, 0.0), 0.0);
    tilted.palm_rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.2);
    let flat = hand_at(Chirality::Left, Vector3::new(0.01, 0.25, 0.0), 0.0);
    let frame = engine.fuse(0.0, &[(a, tilted), (b, flat)]).unwrap();

    let rotation = frame.left().unwrap().hand.palm_rotation;
    let angle = rotation.angle_to(&UnitQuaternion::identity());
    assert!(angle > 0.01 && angle < 0.19, "angle = {angle}");
}

/// Paints every joint as a disc, except the index tip when seen from x < 0
struct GridRenderer;

impl IdPassRenderer for GridRenderer {
    fn render_joint_ids(&mut self, viewpoint: &Pose, _sample: &HandSample) -> Option<IdPass> {
        let mut pixels = PixelBuffer::filled(96, 64, [0, 0, 0, 0xFF]);
        let mut joints = [None; JOINT_COUNT];
        for (j, slot) in joints.iter_mut().enumerate() {
            if j == INDEX_TIP && viewpoint.position.x < 0.0 {
                continue;
            }
            let projected = ProjectedJoint {
                x: 8.0 + 16.0 * (j % 6) as f32,
                y: 8.0 + 16.0 * (j / 6) as f32,
                radius_px: 3.0,
            };
            for y in 0..64u32 {
                for x in 0..96u32 {
                    let dx = x as f32 + 0.5 - projected.x;
                    let dy = y as f32 + 0.5 - projected.y;
                    if dx * dx + dy * dy <= projected.radius_px * projected.radius_px {
                        pixels.set(x, y, joint_id_color(j));
                    }
                }
            }
            *slot = Some(projected);
        }
        Some(IdPass { pixels, joints })
    }
}

#[test]
fn occluded_joint_follows_the_source_that_sees_it() {
    let mut config = FusionConfig::default();
    config.joint_weights.occlusion = 1.0;
    let mut engine = AggregationEngine::new(config)
        .unwrap()
        .with_visibility(Box::new(IdPassVisibility::new(GridRenderer)));
    let blind = engine.register_context(context(-0.05)).unwrap();
    let seeing = engine.register_context(context(0.05)).unwrap();

    let palm = Vector3::new(0.0, 0.25, 0.0);
    let mut from_blind = hand_at(Chirality::Left, palm, 0.0);
    from_blind.joints[INDEX_TIP] += Vector3::new(0.0, 0.0, 0.02);
    let from_seeing = hand_at(Chirality::Left, palm, 0.0);

    let frame = engine
        .fuse(0.0, &[(blind, from_blind.clone()), (seeing, from_seeing.clone())])
        .unwrap();
    let hand = &frame.left().unwrap().hand;
    assert_eq!(hand.joints[INDEX_TIP], from_seeing.joints[INDEX_TIP]);
    assert!((hand.joints[WRIST] - from_seeing.joints[WRIST]).norm() < 1e-6);
    assert_eq!(engine.last_report().occlusion_refreshed.len(), 2);
}
