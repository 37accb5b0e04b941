//! Timing and volume of the last encryption and search

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Snapshot of the most recent operations
///
/// Each field is overwritten by the next operation of its kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Wall-clock time of the last encryption, in milliseconds
    pub encryption_time_ms: f64,
    /// Wall-clock time of the last search, in milliseconds
    pub search_time_ms: f64,
    /// Tokens in the last encrypted or searched document
    pub total_tokens: usize,
    /// Ciphertext batches in the last encrypted or searched document
    pub batch_count: usize,
    /// Slots per ciphertext
    pub slot_count: usize,
}

#[derive(Clone, Debug, Default)]
pub struct MetricsRecorder {
    current: PerformanceMetrics,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_encryption(&mut self, elapsed: Duration, tokens: usize, batches: usize, slots: usize) {
        self.current.encryption_time_ms = millis(elapsed);
        self.record_volume(tokens, batches, slots);
    }

    pub fn record_search(&mut self, elapsed: Duration, tokens: usize, batches: usize, slots: usize) {
        self.current.search_time_ms = millis(elapsed);
        self.record_volume(tokens, batches, slots);
    }

    pub fn snapshot(&self) -> PerformanceMetrics {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = PerformanceMetrics::default();
    }

    fn record_volume(&mut self, tokens: usize, batches: usize, slots: usize) {
        self.current.total_tokens = tokens;
        self.current.batch_count = batches;
        self.current.slot_count = slots;
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
