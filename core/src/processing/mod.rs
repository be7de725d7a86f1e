pub mod analyzer;
pub mod conditioner;

pub use analyzer::{SpectralAnalyzer, Spectrum, SpectrumFrame};
pub use conditioner::{condition, SignalConditioner};
