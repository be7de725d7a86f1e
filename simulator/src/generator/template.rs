use std::f64::consts::PI;

use num_complex::Complex32;

/// Complex exponential at `offset_hz` relative to the tuned centre.
pub fn complex_tone(
    length: usize,
    offset_hz: f64,
    sample_rate: f64,
    amplitude: f32,
) -> Vec<Complex32> {
    (0..length)
        .map(|i| {
            let phase = 2.0 * PI * offset_hz * i as f64 / sample_rate;
            Complex32::new(
                amplitude * phase.cos() as f32,
                amplitude * phase.sin() as f32,
            )
        })
        .collect()
}
