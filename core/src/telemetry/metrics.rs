use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Counters accumulated across scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub steps_recorded: usize,
    pub scans_completed: usize,
    pub scans_aborted: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_step(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.steps_recorded += 1;
        }
    }

    pub fn record_completed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.scans_completed += 1;
        }
    }

    pub fn record_aborted(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.scans_aborted += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
