use std::time::Duration;

use crate::prelude::Axis;

/// Failure reported by a raw device capability (PWM channel, radio front end).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct DeviceError(pub String);

impl DeviceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Outcome of a block read that did not produce samples.
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("read timed out")]
    TimedOut,
    #[error(transparent)]
    Device(#[from] DeviceError),
}

#[derive(thiserror::Error, Debug)]
pub enum ActuatorError {
    #[error("{axis} angle {degrees} outside [0, 180] degrees")]
    OutOfRange { axis: Axis, degrees: f64 },
    #[error("{axis} drive failure: {source}")]
    Drive {
        axis: Axis,
        #[source]
        source: DeviceError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ReceiverError {
    #[error("cannot tune to {frequency_hz} Hz: {reason}")]
    TuneFailed { frequency_hz: f64, reason: String },
    #[error("acquisition at {frequency_hz} Hz did not complete within {timeout:?}")]
    AcquisitionTimeout { frequency_hz: f64, timeout: Duration },
    #[error("short read at {frequency_hz} Hz: expected {expected} samples, got {actual}")]
    ShortRead {
        frequency_hz: f64,
        expected: usize,
        actual: usize,
    },
    #[error("receiver device error: {0}")]
    Device(#[from] DeviceError),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ProcessingError {
    #[error("invalid filter design: {0}")]
    InvalidDesign(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Top-level error surfaced by the scan controller and service.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("actuator error: {0}")]
    Actuator(#[from] ActuatorError),
    #[error("receiver error: {0}")]
    Receiver(#[from] ReceiverError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("processing error: {0}")]
    Processing(#[from] ProcessingError),
    #[error("a scan is already in progress")]
    ScanInProgress,
    #[error("scan cancelled by request")]
    Cancelled,
}

pub type ScanResult<T> = Result<T, ScanError>;
