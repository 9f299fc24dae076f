//! Visibility-duration confidence
//!
//! A freshly (re)acquired hand is least reliable. Trust ramps linearly from
//! 0 to 1 over the configured ramp and then holds.

/// Tracks when a (source, hand) pair became continuously visible
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisibilityTracker {
    visible_since: Option<f64>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the hand seen at `now`; returns seconds of continuous visibility
    pub fn observe(&mut self, now: f64) -> f64 {
        let since = *self.visible_since.get_or_insert(now);
        (now - since).max(0.0)
    }

    /// Mark the hand lost; the next observation restarts the ramp
    pub fn lose(&mut self) {
        self.visible_since = None;
    }

    pub fn visible_since(&self) -> Option<f64> {
        self.visible_since
    }
}

/// Linear ramp from 0 at acquisition to 1 after `ramp_secs`
pub fn duration_confidence(visible_for: f64, ramp_secs: f64) -> f32 {
    if ramp_secs <= 0.0 {
        return 1.0;
    }
    (visible_for / ramp_secs).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramps_then_holds() {
        let mut tracker = VisibilityTracker::new();
        assert_eq!(duration_confidence(tracker.observe(10.0), 1.0), 0.0);
        let half = duration_confidence(tracker.observe(10.5), 1.0);
        assert!((half - 0.5).abs() < 1e-6);
        assert_eq!(duration_confidence(tracker.observe(11.0), 1.0), 1.0);
        assert_eq!(duration_confidence(tracker.observe(30.0), 1.0), 1.0);
    }

    #[test]
    fn losing_the_hand_restarts_the_ramp() {
        let mut tracker = VisibilityTracker::new();
        tracker.observe(0.0);
        tracker.observe(2.0);
        tracker.lose();
        assert_eq!(tracker.visible_since(), None);
        assert_eq!(duration_confidence(tracker.observe(3.0), 1.0), 0.0);
        assert_eq!(tracker.visible_since(), Some(3.0));
    }
}
