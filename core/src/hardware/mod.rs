//! Capability interfaces for the mount and the radio front end.

pub mod actuator;
pub mod receiver;

pub use actuator::{duty_cycle_for, Actuator, PwmChannel, ServoMount};
pub use receiver::{Receiver, ReceiverSweep};
