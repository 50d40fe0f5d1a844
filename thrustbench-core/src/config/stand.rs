//! Stand-wide configuration
//!
//! Fixed per hardware build. The firmware bakes these in at compile time
//! from `stand.toml`; nothing is persisted at runtime.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Hard safety thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SafetyLimits {
    /// Absolute current limit (A); at or above faults
    pub max_current_a: f32,
    /// Critical temperature (°C); at or above faults
    pub critical_temp_c: f32,
    /// Advisory temperature (°C); triggers cooldown between points
    pub warn_temp_c: f32,
    /// Minimum pack voltage (V); at or below faults
    pub min_voltage_v: f32,
    /// Consecutive ticks a condition must hold before it latches
    pub fault_debounce_ticks: u8,
    /// Age after which a sensor channel counts as stale (ms)
    pub stale_timeout_ms: u32,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_current_a: 40.0,
            critical_temp_c: 80.0,
            warn_temp_c: 60.0,
            min_voltage_v: 21.0,
            fault_debounce_ticks: 3,
            stale_timeout_ms: 2000,
        }
    }
}

/// ESC pulse width limits and reserved sentinels (µs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorLimits {
    pub min_us: u16,
    pub max_us: u16,
    /// Width written to arm the ESC and to idle between runs
    pub arm_us: u16,
    /// Width written on emergency stop
    pub safe_stop_us: u16,
}

impl Default for ActuatorLimits {
    fn default() -> Self {
        Self {
            min_us: 1000,
            max_us: 2000,
            arm_us: 1000,
            safe_stop_us: 1000,
        }
    }
}

impl ActuatorLimits {
    /// Clamp any width into `[min_us, max_us]`
    pub fn clamp(&self, us: i32) -> u16 {
        us.clamp(i32::from(self.min_us), i32::from(self.max_us)) as u16
    }

    /// Clamp a fractional width and round to the nearest microsecond
    pub fn clamp_f32(&self, us: f32) -> u16 {
        let bounded = us.clamp(f32::from(self.min_us), f32::from(self.max_us));
        (bounded + 0.5) as u16
    }

    /// Check that a width lies within the limits
    pub fn contains(&self, us: u16) -> bool {
        (self.min_us..=self.max_us).contains(&us)
    }
}

/// Control loop and test phase timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SequenceTiming {
    /// Control tick period (ms)
    pub tick_ms: u32,
    /// Settle time after reaching a point before measuring (ms)
    pub settle_ms: u32,
    /// Measurement window length (ms)
    pub window_ms: u32,
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            settle_ms: 6000,
            window_ms: 4000,
        }
    }
}

/// Constant thrust seek tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeekTuning {
    /// Proportional gain (µs per gram of error)
    pub gain_us_per_g: f32,
    /// Convergence band half-width (g)
    pub tolerance_g: f32,
    /// Consecutive in-band ticks before the target counts as reached
    pub converge_ticks: u8,
}

impl Default for SeekTuning {
    fn default() -> Self {
        Self {
            gain_us_per_g: 0.2,
            tolerance_g: 10.0,
            converge_ticks: 10,
        }
    }
}

/// Live telemetry cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetryTiming {
    /// Minimum spacing between live publications (ms)
    pub publish_interval_ms: u32,
}

impl Default for TelemetryTiming {
    fn default() -> Self {
        Self {
            publish_interval_ms: 100,
        }
    }
}

/// Load cell calibration and filtering
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadCellConfig {
    /// Raw counts per gram, measured end to end with a reference mass
    pub counts_per_gram: f32,
    /// Exponential filter constant in (0, 1]; smaller is smoother
    pub filter_alpha: f32,
    /// Raw samples averaged into the zero offset at boot
    pub tare_samples: u8,
}

impl Default for LoadCellConfig {
    fn default() -> Self {
        Self {
            counts_per_gram: 200.0,
            filter_alpha: 0.1,
            tare_samples: 20,
        }
    }
}

/// Complete stand configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StandConfig {
    pub safety: SafetyLimits,
    pub actuator: ActuatorLimits,
    pub timing: SequenceTiming,
    pub seek: SeekTuning,
    pub telemetry: TelemetryTiming,
    pub load_cell: LoadCellConfig,
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl StandConfig {
    /// Reject internally inconsistent settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.actuator;
        if a.min_us >= a.max_us {
            return Err(ConfigError::ActuatorRange);
        }
        if !a.contains(a.arm_us) || !a.contains(a.safe_stop_us) {
            return Err(ConfigError::SentinelOutOfRange);
        }

        let s = &self.safety;
        if !positive(s.max_current_a)
            || !positive(s.critical_temp_c)
            || !positive(s.min_voltage_v)
            || !s.warn_temp_c.is_finite()
        {
            return Err(ConfigError::InvalidThreshold);
        }
        if s.warn_temp_c >= s.critical_temp_c {
            return Err(ConfigError::WarnAboveCritical);
        }
        if s.fault_debounce_ticks == 0 || self.seek.converge_ticks == 0 {
            return Err(ConfigError::ZeroDebounce);
        }

        let t = &self.timing;
        if t.tick_ms == 0
            || t.settle_ms == 0
            || t.window_ms == 0
            || s.stale_timeout_ms == 0
            || self.telemetry.publish_interval_ms == 0
        {
            return Err(ConfigError::ZeroDuration);
        }

        if !positive(self.seek.gain_us_per_g) || !positive(self.seek.tolerance_g) {
            return Err(ConfigError::InvalidGain);
        }

        let l = &self.load_cell;
        if !positive(l.counts_per_gram)
            || !positive(l.filter_alpha)
            || l.filter_alpha > 1.0
            || l.tare_samples == 0
        {
            return Err(ConfigError::InvalidFilter);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(StandConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_reference_constants() {
        let config = StandConfig::default();
        assert_eq!(config.safety.max_current_a, 40.0);
        assert_eq!(config.safety.critical_temp_c, 80.0);
        assert_eq!(config.safety.warn_temp_c, 60.0);
        assert_eq!(config.safety.min_voltage_v, 21.0);
        assert_eq!(config.actuator.min_us, 1000);
        assert_eq!(config.actuator.max_us, 2000);
        assert_eq!(config.timing.tick_ms, 20);
        assert_eq!(config.telemetry.publish_interval_ms, 100);
    }

    #[test]
    fn test_inverted_actuator_range() {
        let mut config = StandConfig::default();
        config.actuator.min_us = 2000;
        assert_eq!(config.validate(), Err(ConfigError::ActuatorRange));
    }

    #[test]
    fn test_safe_stop_outside_limits() {
        let mut config = StandConfig::default();
        config.actuator.safe_stop_us = 900;
        assert_eq!(config.validate(), Err(ConfigError::SentinelOutOfRange));
    }

    #[test]
    fn test_warn_must_be_below_critical() {
        let mut config = StandConfig::default();
        config.safety.warn_temp_c = 80.0;
        assert_eq!(config.validate(), Err(ConfigError::WarnAboveCritical));
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = StandConfig::default();
        config.timing.window_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration));
    }

    #[test]
    fn test_filter_alpha_above_one_rejected() {
        let mut config = StandConfig::default();
        config.load_cell.filter_alpha = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidFilter));
    }

    #[test]
    fn test_clamp() {
        let limits = ActuatorLimits::default();
        assert_eq!(limits.clamp(-5), 1000);
        assert_eq!(limits.clamp(1500), 1500);
        assert_eq!(limits.clamp(9000), 2000);
        assert_eq!(limits.clamp_f32(1499.6), 1500);
        assert_eq!(limits.clamp_f32(f32::INFINITY), 2000);
    }
}
