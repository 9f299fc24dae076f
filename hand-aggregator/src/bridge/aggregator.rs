//! Push-driven aggregation for JS hosts
//!
//! JS registers each tracker once, pushes every hand it sees during a frame,
//! then calls `aggregate_tick` to fuse and drain the pending observations.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::config::FusionConfig;
use crate::device::DeviceFamily;
use crate::error::FusionError;
use crate::fusion::AggregationEngine;
use crate::hand::{Chirality, HandSample, Pose};
use crate::source::{SourceContext, SourceId};

/// Bridge-level failures, surfaced to JS as thrown strings
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("aggregator not initialized, call init_aggregator first")]
    NotInitialized,

    #[error("unknown device family '{0}'")]
    UnknownDevice(String),

    #[error("failed to serialize tick report: {0}")]
    Report(#[source] serde_json::Error),

    #[error(transparent)]
    Fusion(#[from] FusionError),
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

struct AggregatorState {
    engine: AggregationEngine,
    pending: Vec<(SourceId, HandSample)>,
}

// Thread-local storage (WASM is single-threaded)
thread_local! {
    static AGGREGATOR: RefCell<Option<AggregatorState>> = const { RefCell::new(None) };
}

fn with_state<T>(f: impl FnOnce(&mut AggregatorState) -> Result<T, BridgeError>) -> Result<T, JsValue> {
    AGGREGATOR.with(|cell| {
        let mut slot = cell.borrow_mut();
        let state = slot.as_mut().ok_or(BridgeError::NotInitialized)?;
        f(state).map_err(JsValue::from)
    })
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Create (or replace) the engine. An empty string uses the defaults.
#[wasm_bindgen]
pub fn init_aggregator(config_json: &str) -> Result<(), JsValue> {
    let config = if config_json.trim().is_empty() {
        FusionConfig::default()
    } else {
        FusionConfig::from_json_str(config_json).map_err(BridgeError::from)?
    };
    let engine = AggregationEngine::new(config).map_err(BridgeError::from)?;

    AGGREGATOR.with(|cell| {
        *cell.borrow_mut() = Some(AggregatorState {
            engine,
            pending: Vec::new(),
        });
    });
    web_sys::console::log_1(&"Hand aggregator initialized".into());
    Ok(())
}

/// Register a tracker mounted at `origin` (`[x, y, z, qx, qy, qz, qw]`).
/// Returns the source id used by `push_hand`.
#[wasm_bindgen]
pub fn register_source(origin: &[f32], device: &str) -> Result<usize, JsValue> {
    with_state(|state| {
        let origin = Pose::from_flat(origin)?;
        let family =
            DeviceFamily::parse(device).ok_or_else(|| BridgeError::UnknownDevice(device.to_string()))?;
        let context = SourceContext::for_device(origin, family, &state.engine.config().devices)?;
        let id = state.engine.register_context(context)?;
        Ok(id.index())
    })
}

/// Queue one hand seen by `source` this frame.
/// `palm` is a flat pose, `joints` 21 or 22 `[x, y, z]` triples.
#[wasm_bindgen]
pub fn push_hand(source: usize, is_right: bool, palm: &[f32], joints: &[f32], timestamp: f64) -> Result<(), JsValue> {
    with_state(|state| {
        if source >= state.engine.source_count() {
            return Err(FusionError::UnknownSource(source).into());
        }
        let chirality = if is_right { Chirality::Right } else { Chirality::Left };
        let sample = HandSample::from_flat(chirality, palm, joints, timestamp).map_err(|e| {
            web_sys::console::warn_1(&format!("Dropping hand from source {source}: {e}").into());
            e
        })?;
        state.pending.push((SourceId(source), sample));
        Ok(())
    })
}

/// Fuse everything pushed since the last call.
/// Returns `FLAT_HAND_LEN` floats per fused hand (see `FusedFrame::to_flat`).
#[wasm_bindgen]
pub fn aggregate_tick(timestamp: f64) -> Result<Vec<f32>, JsValue> {
    with_state(|state| {
        let pending = std::mem::take(&mut state.pending);
        let frame = state.engine.fuse(timestamp, &pending)?;
        Ok(frame.to_flat())
    })
}

/// `aggregate_tick` stamped with the browser clock (seconds)
#[wasm_bindgen]
pub fn aggregate_tick_now() -> Result<Vec<f32>, JsValue> {
    aggregate_tick(js_sys::Date::now() / 1000.0)
}

/// Diagnostics for the last tick as JSON
#[wasm_bindgen]
pub fn get_tick_report() -> Result<String, JsValue> {
    with_state(|state| {
        serde_json::to_string(state.engine.last_report()).map_err(BridgeError::Report)
    })
}

/// Number of registered sources, 0 before `init_aggregator`
#[wasm_bindgen]
pub fn source_count() -> usize {
    AGGREGATOR.with(|cell| cell.borrow().as_ref().map_or(0, |s| s.engine.source_count()))
}
