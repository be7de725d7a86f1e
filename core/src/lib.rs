//! Scan controller core for the azimuth/elevation radio telescope.
//!
//! The controller points a two-axis servo mount, sweeps an SDR across a
//! frequency range and records the peak spectral power seen at every step.
//! Hardware is reached only through the capability traits in [`hardware`],
//! so the same core runs against real drivers, simulators and test fakes.

pub mod controller;
pub mod error;
pub mod hardware;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ScanController, ScanRequest, ScanService, ScanState};
pub use prelude::{Angle, Axis, SampleBlock, ScanError, ScanSettings, SweepSpec};
