use std::collections::VecDeque;

use scancore::controller::{ProgressEvent, ScanEvent, ScanState, ScanStatus};
use scancore::processing::SpectrumFrame;
use scancore::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Number of progress events kept for the live plot.
pub const RECENT_LIMIT: usize = 256;

/// State served to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub status: ScanStatus,
    pub metrics: MetricsSnapshot,
    pub recent: VecDeque<ProgressEvent>,
    pub spectrum: Option<SpectrumFrame>,
}

impl VisualizationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one controller event into the model.
    pub fn apply(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::StateChanged { state } => {
                if *state == ScanState::Positioning {
                    self.recent.clear();
                    self.spectrum = None;
                }
                self.status.state = *state;
            }
            ScanEvent::Progress(progress) => {
                self.status.steps_completed = progress.step;
                self.status.total_steps = progress.total_steps;
                self.status.last_frequency_hz = Some(progress.frequency_hz);
                self.status.azimuth = Some(progress.azimuth);
                self.status.elevation = Some(progress.elevation);
                if self.recent.len() == RECENT_LIMIT {
                    self.recent.pop_front();
                }
                self.recent.push_back(progress.clone());
            }
            ScanEvent::Spectrum(frame) => self.spectrum = Some(frame.clone()),
            ScanEvent::Finished(outcome) => {
                self.status.state = outcome.state;
                self.status.last_outcome = Some(outcome.clone());
            }
        }
    }
}
