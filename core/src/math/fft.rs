use std::sync::Arc;

use num_complex::Complex32;
use rustfft::{num_traits::Zero, Fft, FftPlanner};

use crate::prelude::ProcessingError;

/// Helper that wraps the `rustfft` planner for a fixed transform length.
pub struct FftHelper {
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex32::zero(); fft.get_inplace_scratch_len()];
        Self { fft, scratch }
    }

    pub fn len(&self) -> usize {
        self.fft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fft.len() == 0
    }

    /// Forward transform; the input must match the planned length exactly.
    pub fn forward(&mut self, input: &[Complex32]) -> Result<Vec<Complex32>, ProcessingError> {
        if input.len() != self.len() {
            return Err(ProcessingError::InvalidInput(format!(
                "expected {} samples, got {}",
                self.len(),
                input.len()
            )));
        }

        let mut buffer = input.to_vec();
        self.fft.process_with_scratch(&mut buffer, &mut self.scratch);
        Ok(buffer)
    }
}

/// Moves the zero-frequency bin to the centre of the slice.
pub fn fft_shift<T>(data: &mut [T]) {
    let half = data.len() / 2;
    data.rotate_right(half);
}

/// Centre frequencies (Hz, relative to the tuned frequency) of fft-shifted bins.
pub fn shifted_bin_frequencies(len: usize, sample_rate: f64) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    let resolution = sample_rate / len as f64;
    let lowest = -((len / 2) as f64);
    (0..len)
        .map(|idx| (lowest + idx as f64) * resolution)
        .collect()
}
