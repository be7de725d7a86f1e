pub mod butterworth;
pub mod fft;
pub mod stats;

pub use butterworth::ButterworthLowpass;
pub use fft::{fft_shift, shifted_bin_frequencies, FftHelper};
pub use stats::StatsHelper;
