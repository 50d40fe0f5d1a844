//! ESC signal output over a PWM channel
//!
//! Hobby ESCs expect a 50 Hz frame with a 1000-2000 µs high pulse. The PWM
//! channel is configured for the frame period by the caller; this driver
//! maps widths onto its duty range.

use embedded_hal::pwm::SetDutyCycle;
use thrustbench_core::config::ActuatorLimits;
use thrustbench_core::traits::EscDriver;

/// Standard servo frame period (50 Hz)
pub const FRAME_PERIOD_US: u16 = 20_000;

/// ESC driven by one PWM output
pub struct PwmEsc<P> {
    pwm: P,
    limits: ActuatorLimits,
    period_us: u16,
    /// Width of the last successful write, 0 before the first one
    pulse_us: u16,
    write_errors: u32,
}

impl<P: SetDutyCycle> PwmEsc<P> {
    /// Create a new ESC driver for a channel running at the standard frame period
    pub fn new(pwm: P, limits: ActuatorLimits) -> Self {
        Self::with_period(pwm, limits, FRAME_PERIOD_US)
    }

    /// Create a new ESC driver for a channel with a custom frame period
    pub fn with_period(pwm: P, limits: ActuatorLimits, period_us: u16) -> Self {
        Self {
            pwm,
            limits,
            period_us,
            pulse_us: 0,
            write_errors: 0,
        }
    }

    /// Failed PWM writes since creation
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    /// Release the PWM channel
    pub fn release(self) -> P {
        self.pwm
    }

    fn write(&mut self, us: u16) {
        let us = self.limits.clamp(i32::from(us)).min(self.period_us);
        match self.pwm.set_duty_cycle_fraction(us, self.period_us) {
            Ok(()) => self.pulse_us = us,
            Err(_) => self.write_errors = self.write_errors.saturating_add(1),
        }
    }
}

impl<P: SetDutyCycle> EscDriver for PwmEsc<P> {
    fn arm(&mut self) {
        self.write(self.limits.arm_us);
    }

    fn set_pulse_us(&mut self, us: u16) {
        self.write(us);
    }

    fn emergency_stop(&mut self) {
        self.write(self.limits.safe_stop_us);
    }

    fn pulse_us(&self) -> u16 {
        self.pulse_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::pwm::{ErrorKind, ErrorType};

    struct MockPwm {
        max: u16,
        duty: u16,
        fail: bool,
    }

    impl MockPwm {
        fn new(max: u16) -> Self {
            Self {
                max,
                duty: 0,
                fail: false,
            }
        }
    }

    impl ErrorType for MockPwm {
        type Error = ErrorKind;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_width_maps_to_duty() {
        // 1 µs resolution
        let mut esc = PwmEsc::new(MockPwm::new(20_000), ActuatorLimits::default());
        esc.set_pulse_us(1500);
        assert_eq!(esc.pulse_us(), 1500);
        assert_eq!(esc.release().duty, 1500);

        // 0.5 µs resolution
        let mut esc = PwmEsc::new(MockPwm::new(40_000), ActuatorLimits::default());
        esc.set_pulse_us(1250);
        assert_eq!(esc.release().duty, 2500);
    }

    #[test]
    fn test_width_clamped_to_limits() {
        let mut esc = PwmEsc::new(MockPwm::new(20_000), ActuatorLimits::default());
        esc.set_pulse_us(2600);
        assert_eq!(esc.pulse_us(), 2000);
        esc.set_pulse_us(400);
        assert_eq!(esc.pulse_us(), 1000);
    }

    #[test]
    fn test_arm_and_stop_widths() {
        let limits = ActuatorLimits {
            min_us: 1000,
            max_us: 2000,
            arm_us: 1050,
            safe_stop_us: 1000,
        };
        let mut esc = PwmEsc::new(MockPwm::new(20_000), limits);
        esc.arm();
        assert_eq!(esc.pulse_us(), 1050);
        esc.set_pulse_us(1700);
        esc.emergency_stop();
        assert_eq!(esc.pulse_us(), 1000);
    }

    #[test]
    fn test_failed_write_keeps_last_width() {
        let mut esc = PwmEsc::new(MockPwm::new(20_000), ActuatorLimits::default());
        esc.set_pulse_us(1300);
        esc.pwm.fail = true;
        esc.set_pulse_us(1600);
        assert_eq!(esc.pulse_us(), 1300);
        assert_eq!(esc.write_errors(), 1);
    }
}
