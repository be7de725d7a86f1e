use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

use log::debug;
use scancore::hardware::Receiver;
use scancore::prelude::{DeviceError, ReadError, SampleBlock};

use crate::generator::profile::{GeneratorConfig, SkyGenerator};

/// Tuning range of an R820T-based RTL-SDR dongle.
pub const TUNING_RANGE_HZ: RangeInclusive<f64> = 24e6..=1_766e6;

/// Receiver that synthesises blocks from a [`SkyGenerator`].
pub struct SimulatedReceiver {
    sky: SkyGenerator,
    read_latency: Duration,
    sample_rate: f64,
    center_hz: f64,
    configured: bool,
    open: bool,
}

impl SimulatedReceiver {
    pub fn new(sky: GeneratorConfig, read_latency: Duration) -> Self {
        Self {
            sky: SkyGenerator::new(sky),
            read_latency,
            sample_rate: 0.0,
            center_hz: 0.0,
            configured: false,
            open: true,
        }
    }

    #[cfg(test)]
    pub fn center_hz(&self) -> f64 {
        self.center_hz
    }
}

impl Receiver for SimulatedReceiver {
    fn configure(
        &mut self,
        sample_rate: f64,
        center_frequency_hz: f64,
        gain_db: f64,
    ) -> Result<(), DeviceError> {
        if !self.open {
            return Err(DeviceError::new("receiver closed"));
        }
        self.sample_rate = sample_rate;
        self.center_hz = center_frequency_hz;
        self.configured = true;
        debug!(
            "configured {} S/s at {} Hz, gain {} dB",
            sample_rate, center_frequency_hz, gain_db
        );
        Ok(())
    }

    fn tuning_range(&self) -> RangeInclusive<f64> {
        TUNING_RANGE_HZ
    }

    fn tune(&mut self, frequency_hz: f64) -> Result<(), DeviceError> {
        if !self.open || !self.configured {
            return Err(DeviceError::new("receiver not configured"));
        }
        self.center_hz = frequency_hz;
        Ok(())
    }

    fn read_block(&mut self, length: usize, timeout: Duration) -> Result<SampleBlock, ReadError> {
        if !self.open {
            return Err(DeviceError::new("receiver closed").into());
        }
        if self.read_latency > timeout {
            thread::sleep(timeout);
            return Err(ReadError::TimedOut);
        }
        thread::sleep(self.read_latency);
        debug!("synthesising {} samples at {} Hz", length, self.center_hz);
        Ok(self.sky.block(self.center_hz, self.sample_rate, length))
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_require_configuration_and_an_open_device() {
        let mut radio = SimulatedReceiver::new(GeneratorConfig::default(), Duration::ZERO);
        assert!(radio.tune(1420e6).is_err());

        radio.configure(2.048e6, 1420e6, 49.6).unwrap();
        radio.tune(1415e6).unwrap();
        let block = radio.read_block(256, Duration::from_secs(1)).unwrap();
        assert_eq!(block.len(), 256);
        assert_eq!(radio.center_hz(), 1415e6);

        radio.close();
        assert!(radio.read_block(256, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn slow_reads_time_out() {
        let mut radio =
            SimulatedReceiver::new(GeneratorConfig::default(), Duration::from_millis(50));
        radio.configure(2.048e6, 1420e6, 49.6).unwrap();
        let err = radio.read_block(16, Duration::from_millis(5)).unwrap_err();
        assert!(matches!(err, ReadError::TimedOut));
    }
}
