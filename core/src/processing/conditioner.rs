use num_complex::Complex32;

use crate::math::butterworth::ButterworthLowpass;
use crate::prelude::{ProcessingError, SampleBlock, ScanSettings};

/// Amplifies a raw block and runs it through a cold-started Butterworth low-pass.
///
/// The gain is a linear amplitude factor, so every downstream power value is
/// scaled by `gain_factor²`. Filter state never carries over between blocks:
/// the same input always produces the same output.
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    gain_factor: f32,
    filter: ButterworthLowpass,
}

impl SignalConditioner {
    /// `cutoff_ratio` is the cutoff as a fraction of the sample rate and must be below 0.5.
    pub fn new(
        gain_factor: f32,
        cutoff_ratio: f64,
        order: usize,
    ) -> Result<Self, ProcessingError> {
        if !gain_factor.is_finite() {
            return Err(ProcessingError::InvalidDesign(format!(
                "gain factor {} must be finite",
                gain_factor
            )));
        }
        // Relative to Nyquist, the cutoff is twice its fraction of the sample rate.
        let filter = ButterworthLowpass::design(order, 2.0 * cutoff_ratio)?;
        Ok(Self {
            gain_factor,
            filter,
        })
    }

    pub fn from_settings(settings: &ScanSettings) -> Result<Self, ProcessingError> {
        Self::new(
            settings.gain_factor,
            settings.cutoff_ratio,
            settings.filter_order,
        )
    }

    pub fn process(&self, samples: &[Complex32]) -> SampleBlock {
        let amplified: Vec<Complex32> = samples
            .iter()
            .map(|&sample| sample * self.gain_factor)
            .collect();
        self.filter.filter(&amplified)
    }
}

/// One-shot conditioning with the default fifth-order filter.
pub fn condition(
    samples: &[Complex32],
    gain_factor: f32,
    cutoff_ratio: f64,
) -> Result<SampleBlock, ProcessingError> {
    let conditioner = SignalConditioner::new(gain_factor, cutoff_ratio, 5)?;
    Ok(conditioner.process(samples))
}
