//! Per-run test configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ActuatorLimits, ConfigError};

/// Test kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TestKind {
    #[default]
    None,
    /// Open-loop stepped pulse width map
    RampMap,
    /// Closed-loop seek of a thrust target
    ConstantThrust,
}

/// Configuration of one test run
///
/// Copied into the controller when a run starts and immutable until it ends.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TestConfig {
    pub kind: TestKind,
    /// First ramp point, or the starting width of a thrust seek (µs)
    pub pwm_start_us: u16,
    /// Last ramp point (µs)
    pub pwm_end_us: u16,
    /// Ramp increment (µs)
    pub pwm_step_us: u16,
    /// Thrust seek target (g)
    pub target_thrust_g: f32,
}

impl TestConfig {
    /// Stepped map from `start` to `end` inclusive
    pub const fn ramp_map(start_us: u16, end_us: u16, step_us: u16) -> Self {
        Self {
            kind: TestKind::RampMap,
            pwm_start_us: start_us,
            pwm_end_us: end_us,
            pwm_step_us: step_us,
            target_thrust_g: 0.0,
        }
    }

    /// Seek `target_g` starting from `start_us`
    pub const fn constant_thrust(target_g: f32, start_us: u16) -> Self {
        Self {
            kind: TestKind::ConstantThrust,
            pwm_start_us: start_us,
            pwm_end_us: start_us,
            pwm_step_us: 0,
            target_thrust_g: target_g,
        }
    }

    /// Check the configuration against the actuator limits
    pub fn validate(&self, limits: &ActuatorLimits) -> Result<(), ConfigError> {
        match self.kind {
            TestKind::None => Err(ConfigError::NoTestSelected),
            TestKind::RampMap => {
                if self.pwm_step_us == 0 {
                    return Err(ConfigError::EmptyRampStep);
                }
                if self.pwm_end_us < self.pwm_start_us {
                    return Err(ConfigError::InvertedRange);
                }
                if !limits.contains(self.pwm_start_us) || !limits.contains(self.pwm_end_us) {
                    return Err(ConfigError::OutOfActuatorRange);
                }
                Ok(())
            }
            TestKind::ConstantThrust => {
                if !(self.target_thrust_g.is_finite() && self.target_thrust_g > 0.0) {
                    return Err(ConfigError::NonPositiveTarget);
                }
                if !limits.contains(self.pwm_start_us) {
                    return Err(ConfigError::OutOfActuatorRange);
                }
                Ok(())
            }
        }
    }

    /// Number of operating points the run visits
    pub fn point_count(&self) -> u16 {
        match self.kind {
            TestKind::None => 0,
            TestKind::RampMap if self.pwm_step_us == 0 => 0,
            TestKind::RampMap => {
                let span = self.pwm_end_us.saturating_sub(self.pwm_start_us);
                span.div_ceil(self.pwm_step_us) + 1
            }
            TestKind::ConstantThrust => 1,
        }
    }
}
