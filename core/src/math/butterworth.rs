use std::f64::consts::PI;

use num_complex::{Complex32, Complex64};
use rustfft::num_traits::{One, Zero};

use crate::prelude::ProcessingError;

/// Digital Butterworth low-pass held as transfer-function coefficients.
///
/// The design follows the classic route: analog prototype poles, frequency
/// pre-warping, bilinear transform, then expansion of the zero/pole sets into
/// the `b` (numerator) and `a` (denominator) polynomials with `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ButterworthLowpass {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl ButterworthLowpass {
    /// `normalized_cutoff` is the cutoff divided by the Nyquist frequency, in (0, 1).
    pub fn design(order: usize, normalized_cutoff: f64) -> Result<Self, ProcessingError> {
        if order == 0 {
            return Err(ProcessingError::InvalidDesign(
                "filter order must be at least 1".into(),
            ));
        }
        if !(normalized_cutoff > 0.0 && normalized_cutoff < 1.0) {
            return Err(ProcessingError::InvalidDesign(format!(
                "normalized cutoff {} must lie in (0, 1)",
                normalized_cutoff
            )));
        }

        // Bilinear transform at fs = 2 so that Nyquist maps to 1.
        let fs2 = 4.0;
        let warped = fs2 * (PI * normalized_cutoff / 2.0).tan();

        let analog_poles: Vec<Complex64> = (0..order)
            .map(|k| {
                let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
                Complex64::from_polar(warped, theta)
            })
            .collect();

        let denominator: Complex64 = analog_poles.iter().map(|&p| fs2 - p).product();
        let gain = warped.powi(order as i32) * (Complex64::one() / denominator).re;

        let digital_poles: Vec<Complex64> = analog_poles
            .iter()
            .map(|&p| (fs2 + p) / (fs2 - p))
            .collect();
        let digital_zeros = vec![Complex64::new(-1.0, 0.0); order];

        let b = expand_roots(&digital_zeros)
            .iter()
            .map(|c| c.re * gain)
            .collect();
        let a = expand_roots(&digital_poles).iter().map(|c| c.re).collect();

        Ok(Self { b, a })
    }

    pub fn numerator(&self) -> &[f64] {
        &self.b
    }

    pub fn denominator(&self) -> &[f64] {
        &self.a
    }

    pub fn order(&self) -> usize {
        self.a.len() - 1
    }

    /// Runs the difference equation (transposed direct form II) over the whole
    /// block, starting from zero state.
    pub fn filter(&self, input: &[Complex32]) -> Vec<Complex32> {
        let taps = self.order();
        let mut state = vec![Complex64::zero(); taps];

        input
            .iter()
            .map(|sample| {
                let x = Complex64::new(f64::from(sample.re), f64::from(sample.im));
                let y = self.b[0] * x + state[0];
                for i in 0..taps {
                    let carried = if i + 1 < taps {
                        state[i + 1]
                    } else {
                        Complex64::zero()
                    };
                    state[i] = self.b[i + 1] * x - self.a[i + 1] * y + carried;
                }
                Complex32::new(y.re as f32, y.im as f32)
            })
            .collect()
    }

    /// Gain at zero frequency, `sum(b) / sum(a)`.
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }
}

/// Coefficients of the monic polynomial whose roots are `roots`, highest power first.
fn expand_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coefficients = vec![Complex64::one()];
    for &root in roots {
        coefficients.push(Complex64::zero());
        for i in (1..coefficients.len()).rev() {
            let previous = coefficients[i - 1];
            coefficients[i] -= root * previous;
        }
    }
    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{} vs {}", a, e);
        }
    }

    #[test]
    fn fifth_order_design_matches_reference_coefficients() {
        let filter = ButterworthLowpass::design(5, 0.2).unwrap();
        assert_close(
            filter.numerator(),
            &[
                0.0012825810789606849,
                0.006412905394803424,
                0.012825810789606849,
                0.012825810789606849,
                0.006412905394803424,
                0.0012825810789606849,
            ],
        );
        assert_close(
            filter.denominator(),
            &[
                1.0,
                -2.9754221097456828,
                3.8060181193204103,
                -2.5452528683304663,
                0.8811300754378364,
                -0.1254306221553556,
            ],
        );
    }

    #[test]
    fn unity_gain_at_dc() {
        let filter = ButterworthLowpass::design(5, 0.2).unwrap();
        assert!((filter.dc_gain() - 1.0).abs() < 1e-9);

        let step = vec![Complex32::new(1.0, -1.0); 400];
        let settled = *filter.filter(&step).last().unwrap();
        assert!((settled.re - 1.0).abs() < 1e-4);
        assert!((settled.im + 1.0).abs() < 1e-4);
    }

    #[test]
    fn first_output_is_scaled_input() {
        let filter = ButterworthLowpass::design(2, 0.5).unwrap();
        let out = filter.filter(&[Complex32::new(2.0, 0.0)]);
        assert!((f64::from(out[0].re) - 2.0 * filter.numerator()[0]).abs() < 1e-6);
    }

    #[test]
    fn invalid_designs_are_rejected() {
        assert!(ButterworthLowpass::design(0, 0.2).is_err());
        assert!(ButterworthLowpass::design(5, 0.0).is_err());
        assert!(ButterworthLowpass::design(5, 1.0).is_err());
    }
}
