//! Rolling position history for one (source, hand) pair
//!
//! Fixed-size ring of timestamped palm positions. Slots that were never
//! written stay `None`, so an empty slot is never confused with a sample
//! taken at the origin.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Default number of samples kept per (source, hand)
pub const HISTORY_CAPACITY: usize = 10;

/// One timestamped palm position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub position: Vector3<f32>,
    pub time: f64,
}

/// Ring buffer of the most recent palm positions
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    slots: Vec<Option<HistorySample>>,

    /// Next slot to write
    write_index: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Capacity is clamped to at least one slot
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            write_index: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Record a sample, overwriting the oldest once full
    pub fn add(&mut self, position: Vector3<f32>, time: f64) {
        self.slots[self.write_index] = Some(HistorySample { position, time });
        self.write_index = (self.write_index + 1) % self.capacity();
    }

    /// Sample `k` steps before the newest (`k = 0` is the newest).
    ///
    /// Returns `None` when that slot has never been written.
    pub fn get_past(&self, k: usize) -> Option<HistorySample> {
        let cap = self.capacity();
        if k >= cap {
            return None;
        }
        let idx = (self.write_index + cap - 1 - k) % cap;
        self.slots[idx]
    }

    pub fn newest(&self) -> Option<HistorySample> {
        self.get_past(0)
    }

    /// Oldest resident sample.
    ///
    /// Walks from the slot about to be overwritten toward the newest and
    /// returns the first one holding data.
    pub fn get_oldest_valid(&self) -> Option<HistorySample> {
        let cap = self.capacity();
        (0..cap)
            .map(|i| (self.write_index + i) % cap)
            .find_map(|idx| self.slots[idx])
    }

    /// Number of resident samples
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.write_index = 0;
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
