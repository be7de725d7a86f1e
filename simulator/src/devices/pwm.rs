use log::debug;
use scancore::hardware::PwmChannel;
use scancore::prelude::DeviceError;

/// Stand-in for a GPIO PWM output at 50 Hz; remembers the last duty cycle.
#[derive(Debug)]
pub struct SimulatedPwm {
    pin: u8,
    duty: f64,
    running: bool,
}

impl SimulatedPwm {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            duty: 0.0,
            running: true,
        }
    }

    #[cfg(test)]
    pub fn duty(&self) -> f64 {
        self.duty
    }
}

impl PwmChannel for SimulatedPwm {
    fn set_duty_cycle(&mut self, percent: f64) -> Result<(), DeviceError> {
        if !self.running {
            return Err(DeviceError::new(format!("PWM on GPIO{} is stopped", self.pin)));
        }
        if !(0.0..=100.0).contains(&percent) {
            return Err(DeviceError::new(format!("duty cycle {}% out of range", percent)));
        }
        debug!("GPIO{} duty {:.2}%", self.pin, percent);
        self.duty = percent;
        Ok(())
    }

    fn stop(&mut self) {
        debug!("GPIO{} PWM stopped", self.pin);
        self.duty = 0.0;
        self.running = false;
    }
}
