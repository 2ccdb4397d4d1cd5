//! telemetry/snapshot.rs
//! Immutable view of one marshal operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::MarshalCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub exceptions_written: u64,
    pub exceptions_read: u64,
    pub exceptions_sliced: u64,
    pub slices_written: u64,
    pub slices_read: u64,
    pub slices_skipped: u64,
    pub slices_preserved: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    /// Fraction of decoded payload bytes that belonged to unknown slices.
    pub skipped_ratio: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &MarshalCounters, timer: &TelemetryTimer) -> Self {
        let seen = counters.bytes_payload_read + counters.bytes_payload_skipped;
        let skipped_ratio = if seen > 0 {
            counters.bytes_payload_skipped as f64 / seen as f64
        } else {
            0.0
        };

        Self {
            exceptions_written: counters.exceptions_written,
            exceptions_read: counters.exceptions_read,
            exceptions_sliced: counters.exceptions_sliced,
            slices_written: counters.slices_written,
            slices_read: counters.slices_read,
            slices_skipped: counters.slices_skipped,
            slices_preserved: counters.slices_preserved,
            bytes_encoded: counters.bytes_encoded,
            bytes_decoded: counters.bytes_decoded,
            skipped_ratio,
            elapsed: timer.elapsed(),
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Internal consistency: ratio bounded, stages fit inside elapsed time,
    /// preserved slices are a subset of skipped ones.
    pub fn sanity_check(&self) -> bool {
        (0.0..=1.0).contains(&self.skipped_ratio)
            && self.stage_times.total() <= self.elapsed
            && self.slices_preserved <= self.slices_skipped
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
