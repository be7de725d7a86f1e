use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::prelude::{DeviceError, ReadError, ReceiverError, SampleBlock, ScanSettings};

/// Capability for a tunable complex-baseband receiver.
pub trait Receiver: Send {
    fn configure(
        &mut self,
        sample_rate: f64,
        center_frequency_hz: f64,
        gain_db: f64,
    ) -> Result<(), DeviceError>;

    /// Centre frequencies the front end can tune to.
    fn tuning_range(&self) -> RangeInclusive<f64>;

    fn tune(&mut self, frequency_hz: f64) -> Result<(), DeviceError>;

    /// Reads `length` samples, giving up after `timeout`.
    fn read_block(&mut self, length: usize, timeout: Duration) -> Result<SampleBlock, ReadError>;

    fn close(&mut self);
}

/// Tunes a [`Receiver`] and acquires one fixed-size block per call. No retries.
pub struct ReceiverSweep<R> {
    device: R,
    sample_rate: f64,
    initial_frequency_hz: f64,
    gain_db: f64,
    timeout: Duration,
    configured: bool,
    closed: bool,
}

impl<R: Receiver> ReceiverSweep<R> {
    pub fn new(device: R, settings: &ScanSettings) -> Self {
        Self {
            device,
            sample_rate: settings.sample_rate,
            initial_frequency_hz: settings.initial_frequency_hz,
            gain_db: settings.receiver_gain_db,
            timeout: settings.acquisition_timeout(),
            configured: false,
            closed: false,
        }
    }

    /// Applies sample rate, initial frequency and gain once.
    pub fn open(&mut self) -> Result<(), ReceiverError> {
        if self.configured {
            return Ok(());
        }
        self.device
            .configure(self.sample_rate, self.initial_frequency_hz, self.gain_db)?;
        self.configured = true;
        info!(
            "receiver configured: {} S/s, {} Hz, {} dB",
            self.sample_rate, self.initial_frequency_hz, self.gain_db
        );
        Ok(())
    }

    pub fn tune_and_acquire(
        &mut self,
        frequency_hz: f64,
        block_length: usize,
    ) -> Result<SampleBlock, ReceiverError> {
        let range = self.device.tuning_range();
        if !range.contains(&frequency_hz) {
            return Err(ReceiverError::TuneFailed {
                frequency_hz,
                reason: format!(
                    "outside supported range {}-{} Hz",
                    range.start(),
                    range.end()
                ),
            });
        }

        self.device
            .tune(frequency_hz)
            .map_err(|err| ReceiverError::TuneFailed {
                frequency_hz,
                reason: err.to_string(),
            })?;

        let started = Instant::now();
        let samples = match self.device.read_block(block_length, self.timeout) {
            Ok(samples) => samples,
            Err(ReadError::TimedOut) => return Err(self.timed_out(frequency_hz)),
            Err(ReadError::Device(err)) => return Err(ReceiverError::Device(err)),
        };
        let elapsed = started.elapsed();
        if elapsed > self.timeout {
            return Err(self.timed_out(frequency_hz));
        }

        if samples.len() != block_length {
            return Err(ReceiverError::ShortRead {
                frequency_hz,
                expected: block_length,
                actual: samples.len(),
            });
        }

        debug!(
            "acquired {} samples at {} Hz in {:?}",
            block_length, frequency_hz, elapsed
        );
        Ok(samples)
    }

    /// Releases the device. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.device.close();
        self.closed = true;
        info!("receiver released");
    }

    fn timed_out(&self, frequency_hz: f64) -> ReceiverError {
        warn!("acquisition at {} Hz exceeded {:?}", frequency_hz, self.timeout);
        ReceiverError::AcquisitionTimeout {
            frequency_hz,
            timeout: self.timeout,
        }
    }
}
