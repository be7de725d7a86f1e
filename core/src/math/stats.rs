use num_complex::Complex32;

pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[Complex32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|v| v.norm_sqr()).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    /// Largest value in the slice, or zero when it is empty.
    pub fn peak(values: &[f32]) -> f32 {
        values.iter().copied().fold(0.0, f32::max)
    }
}
