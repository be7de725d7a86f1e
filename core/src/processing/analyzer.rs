use num_complex::Complex32;
use serde::{Deserialize, Serialize};

use crate::math::fft::{fft_shift, shifted_bin_frequencies, FftHelper};
use crate::math::stats::StatsHelper;
use crate::prelude::ProcessingError;

/// Power spectrum of one block, zero frequency centred.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub power: Vec<f32>,
    pub peak_power: f64,
}

/// Full spectrum handed to plotting consumers; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumFrame {
    pub frequency_hz: f64,
    pub bin_offsets_hz: Vec<f64>,
    pub power: Vec<f32>,
}

/// Computes power spectra with a transform length equal to the block length.
pub struct SpectralAnalyzer {
    fft: FftHelper,
    sample_rate: f64,
}

impl SpectralAnalyzer {
    pub fn new(block_length: usize, sample_rate: f64) -> Self {
        Self {
            fft: FftHelper::new(block_length),
            sample_rate,
        }
    }

    pub fn analyze(&mut self, samples: &[Complex32]) -> Result<Spectrum, ProcessingError> {
        let mut bins = self.fft.forward(samples)?;
        fft_shift(&mut bins);
        let power: Vec<f32> = bins.iter().map(|c| c.norm_sqr()).collect();
        let peak_power = f64::from(StatsHelper::peak(&power));
        Ok(Spectrum { power, peak_power })
    }

    /// Peak power across all bins of the block.
    pub fn summarize(&mut self, samples: &[Complex32]) -> Result<f64, ProcessingError> {
        self.analyze(samples).map(|spectrum| spectrum.peak_power)
    }

    pub fn frame(&self, frequency_hz: f64, spectrum: Spectrum) -> SpectrumFrame {
        SpectrumFrame {
            frequency_hz,
            bin_offsets_hz: shifted_bin_frequencies(spectrum.power.len(), self.sample_rate),
            power: spectrum.power,
        }
    }
}
