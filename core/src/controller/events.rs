use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::controller::session::ScanOutcome;
use crate::controller::state::ScanState;
use crate::processing::SpectrumFrame;

/// One completed sweep step, as reported to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// 1-based index of the step just recorded.
    pub step: usize,
    pub total_steps: usize,
    pub frequency_hz: f64,
    pub peak_power: f64,
    pub azimuth: f64,
    pub elevation: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanEvent {
    StateChanged { state: ScanState },
    Progress(ProgressEvent),
    Spectrum(SpectrumFrame),
    Finished(ScanOutcome),
}

/// Receives controller notifications synchronously on the scan thread.
pub trait ScanObserver {
    fn on_event(&self, event: &ScanEvent);
}

impl<F> ScanObserver for F
where
    F: Fn(&ScanEvent),
{
    fn on_event(&self, event: &ScanEvent) {
        self(event)
    }
}

/// Cooperative stop request, checked between sweep steps.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
