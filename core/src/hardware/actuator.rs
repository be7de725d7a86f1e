use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::prelude::{angle_in_range, ActuatorError, Axis, DeviceError};

/// Capability for positioning one mount axis.
pub trait Actuator: Send {
    /// Drives `axis` to `degrees` and returns once the axis is assumed settled.
    fn set_angle(&mut self, axis: Axis, degrees: f64) -> Result<(), ActuatorError>;

    /// De-energizes every drive signal.
    fn release(&mut self);

    /// Final teardown; the actuator is not used afterwards.
    fn shutdown(&mut self) {
        self.release();
    }
}

/// Raw PWM output driving a hobby servo.
pub trait PwmChannel: Send {
    fn set_duty_cycle(&mut self, percent: f64) -> Result<(), DeviceError>;
    fn stop(&mut self);
}

/// Duty cycle (percent at 50 Hz) commanding `degrees` on a 0-180° servo.
pub fn duty_cycle_for(degrees: f64) -> f64 {
    2.0 + degrees / 18.0
}

/// Open-loop two-axis servo mount.
///
/// Each move issues the drive pulse, blocks for the settle period, then zeroes
/// the duty cycle so the servo stops hunting around its set point. There is no
/// position feedback; "settled" means the settle period elapsed.
pub struct ServoMount<P> {
    azimuth: P,
    elevation: P,
    settle: Duration,
}

impl<P: PwmChannel> ServoMount<P> {
    pub fn new(azimuth: P, elevation: P, settle: Duration) -> Self {
        Self {
            azimuth,
            elevation,
            settle,
        }
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    fn channel(&mut self, axis: Axis) -> &mut P {
        match axis {
            Axis::Azimuth => &mut self.azimuth,
            Axis::Elevation => &mut self.elevation,
        }
    }
}

impl<P: PwmChannel> Actuator for ServoMount<P> {
    fn set_angle(&mut self, axis: Axis, degrees: f64) -> Result<(), ActuatorError> {
        if !angle_in_range(degrees) {
            return Err(ActuatorError::OutOfRange { axis, degrees });
        }

        let duty = duty_cycle_for(degrees);
        let settle = self.settle;
        let channel = self.channel(axis);
        debug!("{} -> {:.1}° (duty {:.2}%)", axis, degrees, duty);

        if let Err(source) = channel.set_duty_cycle(duty) {
            if let Err(err) = channel.set_duty_cycle(0.0) {
                warn!("{} could not be de-energized after failure: {}", axis, err);
            }
            return Err(ActuatorError::Drive { axis, source });
        }

        thread::sleep(settle);

        channel
            .set_duty_cycle(0.0)
            .map_err(|source| ActuatorError::Drive { axis, source })
    }

    fn release(&mut self) {
        for axis in [Axis::Azimuth, Axis::Elevation] {
            if let Err(err) = self.channel(axis).set_duty_cycle(0.0) {
                warn!("failed to release {}: {}", axis, err);
            }
        }
    }

    fn shutdown(&mut self) {
        self.release();
        self.azimuth.stop();
        self.elevation.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct RecordingPwm {
        duties: Arc<Mutex<Vec<f64>>>,
        stopped: Arc<Mutex<bool>>,
        fail: bool,
    }

    impl PwmChannel for RecordingPwm {
        fn set_duty_cycle(&mut self, percent: f64) -> Result<(), DeviceError> {
            self.duties.lock().unwrap().push(percent);
            if self.fail && percent > 0.0 {
                return Err(DeviceError::new("gpio busy"));
            }
            Ok(())
        }

        fn stop(&mut self) {
            *self.stopped.lock().unwrap() = true;
        }
    }

    fn mount(az: &RecordingPwm, el: &RecordingPwm) -> ServoMount<RecordingPwm> {
        ServoMount::new(az.clone(), el.clone(), Duration::ZERO)
    }

    #[test]
    fn move_drives_then_releases() {
        let az = RecordingPwm::default();
        let el = RecordingPwm::default();
        let mut servo = mount(&az, &el);

        servo.set_angle(Axis::Azimuth, 90.0).unwrap();
        servo.set_angle(Axis::Elevation, 180.0).unwrap();

        assert_eq!(*az.duties.lock().unwrap(), vec![7.0, 0.0]);
        assert_eq!(*el.duties.lock().unwrap(), vec![12.0, 0.0]);
    }

    #[derive(Clone, Default)]
    struct TimedPwm {
        duties: Arc<Mutex<Vec<(f64, Instant)>>>,
    }

    impl PwmChannel for TimedPwm {
        fn set_duty_cycle(&mut self, percent: f64) -> Result<(), DeviceError> {
            self.duties.lock().unwrap().push((percent, Instant::now()));
            Ok(())
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn move_holds_the_drive_for_the_settle_period() {
        let settle = Duration::from_millis(20);
        let az = TimedPwm::default();
        let mut servo = ServoMount::new(az.clone(), TimedPwm::default(), settle);

        let started = Instant::now();
        servo.set_angle(Axis::Azimuth, 45.0).unwrap();
        let returned = Instant::now();

        let duties = az.duties.lock().unwrap().clone();
        assert_eq!(duties.len(), 2);
        let (drive, driven_at) = duties[0];
        let (release, released_at) = duties[1];
        assert_eq!(drive, 4.5);
        assert_eq!(release, 0.0);
        assert!(released_at.duration_since(driven_at) >= settle);
        assert!(returned.duration_since(started) >= settle);
        assert!(returned >= released_at);
    }

    #[test]
    fn out_of_range_never_touches_the_channel() {
        let az = RecordingPwm::default();
        let el = RecordingPwm::default();
        let mut servo = mount(&az, &el);

        for bad in [-1.0, 180.01, f64::NAN, f64::INFINITY] {
            let err = servo.set_angle(Axis::Azimuth, bad).unwrap_err();
            assert!(matches!(err, ActuatorError::OutOfRange { axis: Axis::Azimuth, .. }));
        }
        assert!(az.duties.lock().unwrap().is_empty());
    }

    #[test]
    fn drive_failure_still_zeroes_the_output() {
        let az = RecordingPwm {
            fail: true,
            ..Default::default()
        };
        let el = RecordingPwm::default();
        let mut servo = mount(&az, &el);

        let err = servo.set_angle(Axis::Azimuth, 10.0).unwrap_err();
        assert!(matches!(err, ActuatorError::Drive { .. }));
        assert_eq!(az.duties.lock().unwrap().last(), Some(&0.0));
    }

    #[test]
    fn shutdown_stops_both_channels() {
        let az = RecordingPwm::default();
        let el = RecordingPwm::default();
        let mut servo = mount(&az, &el);
        servo.shutdown();
        assert!(*az.stopped.lock().unwrap());
        assert!(*el.stopped.lock().unwrap());
    }
}
