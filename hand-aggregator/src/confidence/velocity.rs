//! Velocity confidence - penalize sources reporting a fast-moving palm
//!
//! Speed is measured over the newest unbroken run of history: walking back
//! from the newest sample, the run ends at the first gap longer than the
//! staleness window. A source whose estimate jumps around reads as fast and
//! loses trust relative to a source reporting a steady hand.

use crate::history::{HistoryBuffer, HistorySample};

/// `max(0, 1 - speed / speed_threshold)`.
///
/// Fails closed (0) when the history holds nothing, its newest entry is
/// older than `stale_after_secs` relative to `now`, or the unbroken run
/// ending at the newest entry spans a single timestamp (first observation,
/// or first tick back after a gap).
pub fn velocity_confidence(
    history: &HistoryBuffer,
    now: f64,
    stale_after_secs: f64,
    speed_threshold: f32,
) -> f32 {
    let Some(newest) = history.newest() else {
        return 0.0;
    };
    if now - newest.time > stale_after_secs {
        return 0.0;
    }

    let oldest = continuous_start(history, newest, stale_after_secs);
    let dt = newest.time - oldest.time;
    if dt <= 0.0 {
        return 0.0;
    }

    let speed = (newest.position - oldest.position).norm() / dt as f32;
    (1.0 - speed / speed_threshold).max(0.0)
}

/// Oldest sample reachable from `newest` without crossing a stale gap
fn continuous_start(history: &HistoryBuffer, newest: HistorySample, stale_after_secs: f64) -> HistorySample {
    let mut start = newest;
    for k in 1..history.capacity() {
        match history.get_past(k) {
            Some(prev) if start.time - prev.time <= stale_after_secs => start = prev,
            _ => break,
        }
    }
    start
}
