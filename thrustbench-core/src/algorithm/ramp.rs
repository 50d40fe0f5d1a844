//! Open-loop ramp map
//!
//! Walks the arithmetic progression `start, start + step, ...` up to `end`
//! inclusive. When the step does not divide the range, the last point is
//! clamped to `end`. Settling is left to the stabilize phase, so every
//! point counts as reached as soon as it is commanded.

use super::{AlgorithmOutput, TestAlgorithm};
use crate::config::{ActuatorLimits, TestConfig};
use crate::store::Snapshot;

#[derive(Debug, Clone)]
pub struct RampMap {
    limits: ActuatorLimits,
    index: u16,
}

impl RampMap {
    /// Create a ramp positioned on its first point
    pub fn new(limits: ActuatorLimits) -> Self {
        Self { limits, index: 0 }
    }

    /// Width of the current point before actuator clamping
    fn raw_point(&self, config: &TestConfig) -> u32 {
        let offset = u32::from(self.index) * u32::from(config.pwm_step_us);
        (u32::from(config.pwm_start_us) + offset).min(u32::from(config.pwm_end_us))
    }

    /// Width of the current point
    pub fn command_us(&self, config: &TestConfig) -> u16 {
        let raw = i32::try_from(self.raw_point(config)).unwrap_or(i32::MAX);
        self.limits.clamp(raw)
    }
}

impl TestAlgorithm for RampMap {
    fn step(
        &mut self,
        _snapshot: &Snapshot,
        config: &TestConfig,
        _elapsed_ms: u32,
    ) -> AlgorithmOutput {
        AlgorithmOutput {
            command_us: self.command_us(config),
            target_reached: true,
        }
    }

    fn next_point(&mut self, config: &TestConfig) -> bool {
        if config.pwm_step_us == 0 || self.raw_point(config) >= u32::from(config.pwm_end_us) {
            return false;
        }
        self.index += 1;
        true
    }

    fn point(&self) -> u16 {
        self.index
    }
}
