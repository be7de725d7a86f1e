use std::fmt;
use std::time::Duration;

use num_complex::Complex32;
use serde::{Deserialize, Serialize};

pub use crate::error::{
    ActuatorError, DeviceError, ProcessingError, ReadError, ReceiverError, ScanError, ScanResult,
    StorageError,
};

/// Block of complex baseband samples captured at one tuned frequency.
pub type SampleBlock = Vec<Complex32>;

pub const MIN_ANGLE_DEG: f64 = 0.0;
pub const MAX_ANGLE_DEG: f64 = 180.0;

/// One of the two independently driven mount axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Azimuth,
    Elevation,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Azimuth => f.write_str("azimuth"),
            Axis::Elevation => f.write_str("elevation"),
        }
    }
}

pub fn angle_in_range(degrees: f64) -> bool {
    (MIN_ANGLE_DEG..=MAX_ANGLE_DEG).contains(&degrees)
}

/// Mount angle in degrees, guaranteed to lie in [0, 180].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Angle(f64);

impl Angle {
    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Angle {
    type Error = ScanError;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        if angle_in_range(degrees) {
            Ok(Self(degrees))
        } else {
            Err(ScanError::InvalidParameters(format!(
                "angle {} outside [{}, {}] degrees",
                degrees, MIN_ANGLE_DEG, MAX_ANGLE_DEG
            )))
        }
    }
}

impl From<Angle> for f64 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Linear frequency sweep: `step_count` frequencies from `start_hz` to `stop_hz` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    pub start_hz: f64,
    pub stop_hz: f64,
    pub step_count: usize,
}

impl SweepSpec {
    pub fn new(start_hz: f64, stop_hz: f64, step_count: usize) -> ScanResult<Self> {
        let spec = Self {
            start_hz,
            stop_hz,
            step_count,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if !self.start_hz.is_finite() || !self.stop_hz.is_finite() {
            return Err(ScanError::InvalidParameters(
                "sweep frequencies must be finite".into(),
            ));
        }
        if self.start_hz <= 0.0 {
            return Err(ScanError::InvalidParameters(format!(
                "sweep start {} Hz must be positive",
                self.start_hz
            )));
        }
        if self.stop_hz < self.start_hz {
            return Err(ScanError::InvalidParameters(format!(
                "sweep stop {} Hz is below start {} Hz",
                self.stop_hz, self.start_hz
            )));
        }
        if self.step_count == 0 {
            return Err(ScanError::InvalidParameters(
                "sweep needs at least one step".into(),
            ));
        }
        Ok(())
    }

    /// Frequency of the step at `index`; the last step lands exactly on `stop_hz`.
    pub fn frequency_at(&self, index: usize) -> f64 {
        if self.step_count <= 1 || index == 0 {
            return self.start_hz;
        }
        if index + 1 >= self.step_count {
            return self.stop_hz;
        }
        let step = (self.stop_hz - self.start_hz) / (self.step_count - 1) as f64;
        self.start_hz + step * index as f64
    }

    /// Lazy iterator over the sweep; call again to restart.
    pub fn frequencies(&self) -> SweepIter {
        SweepIter {
            spec: *self,
            next: 0,
        }
    }
}

impl Default for SweepSpec {
    fn default() -> Self {
        Self {
            start_hz: 1_400e6,
            stop_hz: 1_430e6,
            step_count: 100,
        }
    }
}

impl<'a> IntoIterator for &'a SweepSpec {
    type Item = f64;
    type IntoIter = SweepIter;

    fn into_iter(self) -> Self::IntoIter {
        self.frequencies()
    }
}

#[derive(Debug, Clone)]
pub struct SweepIter {
    spec: SweepSpec,
    next: usize,
}

impl Iterator for SweepIter {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next >= self.spec.step_count {
            return None;
        }
        let frequency = self.spec.frequency_at(self.next);
        self.next += 1;
        Some(frequency)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.spec.step_count.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepIter {}

/// Peak spectral power observed at one sweep frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralSummary {
    pub frequency_hz: f64,
    pub peak_power: f64,
}

/// Controller-wide settings shared by the receiver, conditioning and analysis stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub sample_rate: f64,
    pub initial_frequency_hz: f64,
    pub receiver_gain_db: f64,
    pub block_length: usize,
    /// Linear amplitude gain applied before filtering; peak power scales with its square.
    pub gain_factor: f32,
    /// Low-pass cutoff as a fraction of the sample rate.
    pub cutoff_ratio: f64,
    pub filter_order: usize,
    pub settle_ms: u64,
    pub acquisition_timeout_ms: u64,
    pub sweep: SweepSpec,
    pub forward_spectrum: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            sample_rate: 2.048e6,
            initial_frequency_hz: 1_420e6,
            receiver_gain_db: 49.6,
            block_length: 256 * 1024,
            gain_factor: 15.0,
            cutoff_ratio: 0.1,
            filter_order: 5,
            settle_ms: 500,
            acquisition_timeout_ms: 5_000,
            sweep: SweepSpec::default(),
            forward_spectrum: false,
        }
    }
}

impl ScanSettings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn acquisition_timeout(&self) -> Duration {
        Duration::from_millis(self.acquisition_timeout_ms)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ScanError::InvalidParameters(format!(
                "sample rate {} must be positive",
                self.sample_rate
            )));
        }
        if self.block_length == 0 {
            return Err(ScanError::InvalidParameters(
                "block length must be non-zero".into(),
            ));
        }
        if !self.gain_factor.is_finite() {
            return Err(ScanError::InvalidParameters("gain factor must be finite".into()));
        }
        if self.acquisition_timeout_ms == 0 {
            return Err(ScanError::InvalidParameters(
                "acquisition timeout must be non-zero".into(),
            ));
        }
        self.sweep.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_step_sweep_hits_both_ends() {
        let spec = SweepSpec::new(1400e6, 1430e6, 3).unwrap();
        let freqs: Vec<f64> = spec.frequencies().collect();
        assert_eq!(freqs, vec![1400e6, 1415e6, 1430e6]);
    }

    #[test]
    fn sweep_is_restartable() {
        let spec = SweepSpec::default();
        assert_eq!(spec.frequencies().len(), 100);
        let first: Vec<f64> = spec.frequencies().take(2).collect();
        let again: Vec<f64> = (&spec).into_iter().take(2).collect();
        assert_eq!(first, again);
        assert_eq!(spec.frequencies().last(), Some(1430e6));
    }

    #[test]
    fn single_step_sweep_yields_start() {
        let spec = SweepSpec::new(1420e6, 1420e6, 1).unwrap();
        assert_eq!(spec.frequencies().collect::<Vec<_>>(), vec![1420e6]);
    }

    #[test]
    fn malformed_sweeps_are_rejected() {
        assert!(matches!(
            SweepSpec::new(1430e6, 1400e6, 3),
            Err(ScanError::InvalidParameters(_))
        ));
        assert!(matches!(
            SweepSpec::new(1400e6, 1430e6, 0),
            Err(ScanError::InvalidParameters(_))
        ));
        assert!(SweepSpec::new(f64::NAN, 1430e6, 3).is_err());
    }

    #[test]
    fn angle_bounds_are_inclusive() {
        assert!(Angle::try_from(0.0).is_ok());
        assert!(Angle::try_from(180.0).is_ok());
        assert!(Angle::try_from(-0.5).is_err());
        assert!(Angle::try_from(180.5).is_err());
        assert!(Angle::try_from(f64::NAN).is_err());
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = ScanSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.block_length, 262_144);
        assert_eq!(settings.settle(), Duration::from_millis(500));
    }
}
