//! In-memory capabilities for exercising the controller without hardware.

use std::ops::RangeInclusive;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use num_complex::Complex32;

use crate::hardware::{Actuator, Receiver};
use crate::prelude::{
    angle_in_range, ActuatorError, Axis, DeviceError, ReadError, SampleBlock, ScanSettings,
    StorageError, SweepSpec,
};
use crate::storage::{ScanRecord, ScanRecorder};

pub fn test_settings() -> ScanSettings {
    ScanSettings {
        block_length: 64,
        settle_ms: 0,
        acquisition_timeout_ms: 10_000,
        sweep: SweepSpec::new(1400e6, 1420e6, 5).unwrap(),
        ..Default::default()
    }
}

#[derive(Debug, Default)]
pub struct ActuatorLog {
    pub moves: Vec<(Axis, f64)>,
    pub releases: usize,
    pub shutdowns: usize,
}

#[derive(Clone, Default)]
pub struct FakeActuator {
    log: Arc<Mutex<ActuatorLog>>,
    fail_on: Option<Axis>,
}

impl FakeActuator {
    pub fn failing_on(axis: Axis) -> Self {
        Self {
            fail_on: Some(axis),
            ..Default::default()
        }
    }

    pub fn moves(&self) -> Vec<(Axis, f64)> {
        self.log.lock().unwrap().moves.clone()
    }

    pub fn releases(&self) -> usize {
        self.log.lock().unwrap().releases
    }

    pub fn shutdowns(&self) -> usize {
        self.log.lock().unwrap().shutdowns
    }
}

impl Actuator for FakeActuator {
    fn set_angle(&mut self, axis: Axis, degrees: f64) -> Result<(), ActuatorError> {
        if !angle_in_range(degrees) {
            return Err(ActuatorError::OutOfRange { axis, degrees });
        }
        self.log.lock().unwrap().moves.push((axis, degrees));
        if self.fail_on == Some(axis) {
            return Err(ActuatorError::Drive {
                axis,
                source: DeviceError::new("servo stalled"),
            });
        }
        Ok(())
    }

    fn release(&mut self) {
        self.log.lock().unwrap().releases += 1;
    }

    fn shutdown(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.releases += 1;
        log.shutdowns += 1;
    }
}

#[derive(Debug, Default)]
pub struct ReceiverLog {
    pub configured: Vec<(f64, f64, f64)>,
    pub tuned: Vec<f64>,
    pub reads: usize,
    pub closes: usize,
}

enum ReadFailure {
    TimedOut,
    Device,
}

/// Receiver returning the same block on every read.
pub struct FakeReceiver {
    block: SampleBlock,
    log: Arc<Mutex<ReceiverLog>>,
    failure: Option<(usize, ReadFailure)>,
    gate: Option<(mpsc::Receiver<()>, mpsc::Sender<()>)>,
}

impl FakeReceiver {
    pub fn constant(len: usize) -> Self {
        Self {
            block: vec![Complex32::new(1.0, 0.5); len],
            log: Arc::new(Mutex::new(ReceiverLog::default())),
            failure: None,
            gate: None,
        }
    }

    /// Fails the `read`-th read (1-based) with a device error.
    pub fn failing_on_read(mut self, read: usize) -> Self {
        self.failure = Some((read, ReadFailure::Device));
        self
    }

    pub fn timing_out_on_read(mut self, read: usize) -> Self {
        self.failure = Some((read, ReadFailure::TimedOut));
        self
    }

    /// Every read first signals `entered`, then blocks until `gate` yields or disconnects.
    pub fn gated(mut self, gate: mpsc::Receiver<()>, entered: mpsc::Sender<()>) -> Self {
        self.gate = Some((gate, entered));
        self
    }

    pub fn log(&self) -> Arc<Mutex<ReceiverLog>> {
        self.log.clone()
    }
}

impl Receiver for FakeReceiver {
    fn configure(
        &mut self,
        sample_rate: f64,
        center_frequency_hz: f64,
        gain_db: f64,
    ) -> Result<(), DeviceError> {
        self.log
            .lock()
            .unwrap()
            .configured
            .push((sample_rate, center_frequency_hz, gain_db));
        Ok(())
    }

    fn tuning_range(&self) -> RangeInclusive<f64> {
        24e6..=1_766e6
    }

    fn tune(&mut self, frequency_hz: f64) -> Result<(), DeviceError> {
        self.log.lock().unwrap().tuned.push(frequency_hz);
        Ok(())
    }

    fn read_block(&mut self, _length: usize, _timeout: Duration) -> Result<SampleBlock, ReadError> {
        let read = {
            let mut log = self.log.lock().unwrap();
            log.reads += 1;
            log.reads
        };

        if let Some((gate, entered)) = &self.gate {
            let _ = entered.send(());
            let _ = gate.recv();
        }

        match &self.failure {
            Some((n, ReadFailure::TimedOut)) if *n == read => Err(ReadError::TimedOut),
            Some((n, ReadFailure::Device)) if *n == read => {
                Err(ReadError::Device(DeviceError::new("usb transfer failed")))
            }
            _ => Ok(self.block.clone()),
        }
    }

    fn close(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }
}

#[derive(Debug, Default)]
struct RecorderLog {
    records: Vec<ScanRecord>,
    appends: usize,
    finishes: usize,
}

#[derive(Clone, Default)]
pub struct MemoryRecorder {
    log: Arc<Mutex<RecorderLog>>,
    fail_on_append: Option<usize>,
}

impl MemoryRecorder {
    /// Fails the `append`-th append (1-based).
    pub fn failing_on_append(append: usize) -> Self {
        Self {
            fail_on_append: Some(append),
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<ScanRecord> {
        self.log.lock().unwrap().records.clone()
    }

    pub fn finishes(&self) -> usize {
        self.log.lock().unwrap().finishes
    }
}

impl ScanRecorder for MemoryRecorder {
    fn append(&mut self, record: &ScanRecord) -> Result<(), StorageError> {
        let mut log = self.log.lock().unwrap();
        log.appends += 1;
        if self.fail_on_append == Some(log.appends) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        log.records.push(*record);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StorageError> {
        self.log.lock().unwrap().finishes += 1;
        Ok(())
    }
}
