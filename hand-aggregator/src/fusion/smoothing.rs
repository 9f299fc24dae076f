//! One Euro filter on the fused palm position
//!
//! Smooth when slow (reduces jitter), responsive when fast. The cutoff is
//! driven by the filtered speed magnitude so all three axes share one
//! adaptive cutoff and the output does not lag differently per axis.

use std::f32::consts::PI;

use nalgebra::Vector3;

use crate::config::SmoothingConfig;

/// Derivative cutoff frequency (Hz)
const DERIVATIVE_CUTOFF: f32 = 1.0;

/// Adaptive low-pass filter over a 3D point
#[derive(Debug, Clone)]
pub struct PalmSmoother {
    min_cutoff: f32,
    beta: f32,
    state: Option<SmootherState>,
}

#[derive(Debug, Clone, Copy)]
struct SmootherState {
    position: Vector3<f32>,
    velocity: Vector3<f32>,
    time: f64,
}

fn smoothing_factor(elapsed: f32, cutoff: f32) -> f32 {
    let r = 2.0 * PI * cutoff * elapsed;
    r / (r + 1.0)
}

impl PalmSmoother {
    pub fn new(config: &SmoothingConfig) -> Self {
        Self {
            min_cutoff: config.min_cutoff,
            beta: config.beta,
            state: None,
        }
    }

    /// Filter `position` observed at `time` (seconds)
    pub fn filter(&mut self, time: f64, position: Vector3<f32>) -> Vector3<f32> {
        let Some(prev) = self.state else {
            self.state = Some(SmootherState {
                position,
                velocity: Vector3::zeros(),
                time,
            });
            return position;
        };

        let elapsed = (time - prev.time) as f32;
        if elapsed <= 0.0 {
            return prev.position;
        }

        let a_d = smoothing_factor(elapsed, DERIVATIVE_CUTOFF);
        let raw_velocity = (position - prev.position) / elapsed;
        let velocity = prev.velocity.lerp(&raw_velocity, a_d);

        let cutoff = self.min_cutoff + self.beta * velocity.norm();
        let a = smoothing_factor(elapsed, cutoff);
        let smoothed = prev.position.lerp(&position, a);

        self.state = Some(SmootherState {
            position: smoothed,
            velocity,
            time,
        });
        smoothed
    }

    /// Forget all state; the next sample passes through unfiltered
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn is_primed(&self) -> bool {
        self.state.is_some()
    }
}
