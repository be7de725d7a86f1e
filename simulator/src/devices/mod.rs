//! Simulated capabilities standing in for the GPIO servos and the RTL-SDR.

pub mod pwm;
pub mod radio;

pub use pwm::SimulatedPwm;
pub use radio::SimulatedReceiver;
