use serde::{Deserialize, Serialize};

use crate::controller::state::ScanState;
use crate::prelude::{Angle, ScanError, ScanResult, SweepSpec};

/// Target pointing plus the sweep to run there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub azimuth: f64,
    pub elevation: f64,
    pub sweep: SweepSpec,
}

impl ScanRequest {
    pub fn new(azimuth: f64, elevation: f64, sweep: SweepSpec) -> Self {
        Self {
            azimuth,
            elevation,
            sweep,
        }
    }

    /// Checks both angles and the sweep without touching any hardware.
    pub fn validate(&self) -> ScanResult<(Angle, Angle)> {
        let azimuth = Angle::try_from(self.azimuth).map_err(|_| {
            ScanError::InvalidParameters(format!(
                "azimuth {} outside [0, 180] degrees",
                self.azimuth
            ))
        })?;
        let elevation = Angle::try_from(self.elevation).map_err(|_| {
            ScanError::InvalidParameters(format!(
                "elevation {} outside [0, 180] degrees",
                self.elevation
            ))
        })?;
        self.sweep.validate()?;
        Ok((azimuth, elevation))
    }
}

/// Per-scan bookkeeping; lives only for one `run_scan` call.
#[derive(Debug)]
pub(crate) struct ScanSession {
    pub azimuth: Angle,
    pub elevation: Angle,
    pub sweep: SweepSpec,
    steps_completed: usize,
    last_frequency_hz: Option<f64>,
}

impl ScanSession {
    pub fn new(azimuth: Angle, elevation: Angle, sweep: SweepSpec) -> Self {
        Self {
            azimuth,
            elevation,
            sweep,
            steps_completed: 0,
            last_frequency_hz: None,
        }
    }

    pub fn total_steps(&self) -> usize {
        self.sweep.step_count
    }

    pub fn steps_completed(&self) -> usize {
        self.steps_completed
    }

    pub fn complete_step(&mut self, frequency_hz: f64) {
        self.steps_completed += 1;
        self.last_frequency_hz = Some(frequency_hz);
    }

    pub fn report(self) -> ScanReport {
        ScanReport {
            azimuth: self.azimuth.degrees(),
            elevation: self.elevation.degrees(),
            steps_completed: self.steps_completed,
            total_steps: self.sweep.step_count,
            last_frequency_hz: self.last_frequency_hz,
        }
    }

    pub fn abort(self, error: ScanError) -> ScanAbort {
        ScanAbort {
            error,
            steps_completed: self.steps_completed,
            total_steps: self.sweep.step_count,
            last_frequency_hz: self.last_frequency_hz,
        }
    }
}

/// Result of a scan that recorded every sweep step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub azimuth: f64,
    pub elevation: f64,
    pub steps_completed: usize,
    pub total_steps: usize,
    pub last_frequency_hz: Option<f64>,
}

impl ScanReport {
    pub fn outcome(&self) -> ScanOutcome {
        ScanOutcome {
            state: ScanState::Completed,
            steps_completed: self.steps_completed,
            total_steps: self.total_steps,
            last_frequency_hz: self.last_frequency_hz,
            error: None,
        }
    }
}

/// A scan that stopped early, with how much of it was durably recorded.
#[derive(Debug, thiserror::Error)]
#[error("scan aborted after {steps_completed}/{total_steps} steps: {error}")]
pub struct ScanAbort {
    #[source]
    pub error: ScanError,
    pub steps_completed: usize,
    pub total_steps: usize,
    pub last_frequency_hz: Option<f64>,
}

impl ScanAbort {
    /// Rejection before anything ran.
    pub fn rejected(error: ScanError, total_steps: usize) -> Self {
        Self {
            error,
            steps_completed: 0,
            total_steps,
            last_frequency_hz: None,
        }
    }

    pub fn outcome(&self) -> ScanOutcome {
        ScanOutcome {
            state: ScanState::Aborted,
            steps_completed: self.steps_completed,
            total_steps: self.total_steps,
            last_frequency_hz: self.last_frequency_hz,
            error: Some(self.error.to_string()),
        }
    }
}

/// Cloneable summary of how a scan ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub state: ScanState,
    pub steps_completed: usize,
    pub total_steps: usize,
    pub last_frequency_hz: Option<f64>,
    pub error: Option<String>,
}
