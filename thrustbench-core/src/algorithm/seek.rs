//! Closed-loop constant thrust seek
//!
//! Proportional correction only: `command += gain * (target - thrust)`,
//! clamped to the actuator limits. With no integral term there is nothing
//! to wind up and the output is bounded by construction.

use super::{AlgorithmOutput, TestAlgorithm};
use crate::config::{ActuatorLimits, SeekTuning, TestConfig};
use crate::store::Snapshot;

fn abs(value: f32) -> f32 {
    if value < 0.0 {
        -value
    } else {
        value
    }
}

#[derive(Debug, Clone)]
pub struct ThrustSeek {
    limits: ActuatorLimits,
    tuning: SeekTuning,
    /// Unrounded command so sub-microsecond corrections accumulate
    command: f32,
    /// Consecutive ticks with the error inside the tolerance band
    in_band: u8,
}

impl ThrustSeek {
    /// Create a seek starting from `start_us`
    pub fn new(start_us: u16, limits: ActuatorLimits, tuning: SeekTuning) -> Self {
        Self {
            limits,
            tuning,
            command: f32::from(limits.clamp(i32::from(start_us))),
            in_band: 0,
        }
    }

    fn output(&self, target_reached: bool) -> AlgorithmOutput {
        AlgorithmOutput {
            command_us: self.limits.clamp_f32(self.command),
            target_reached,
        }
    }
}

impl TestAlgorithm for ThrustSeek {
    fn step(
        &mut self,
        snapshot: &Snapshot,
        config: &TestConfig,
        _elapsed_ms: u32,
    ) -> AlgorithmOutput {
        let error = config.target_thrust_g - snapshot.thrust_g;
        if !error.is_finite() {
            self.in_band = 0;
            return self.output(false);
        }

        let next = self.command + self.tuning.gain_us_per_g * error;
        self.command = next.clamp(f32::from(self.limits.min_us), f32::from(self.limits.max_us));

        if abs(error) <= self.tuning.tolerance_g {
            self.in_band = self.in_band.saturating_add(1);
        } else {
            self.in_band = 0;
        }

        self.output(self.in_band >= self.tuning.converge_ticks)
    }

    fn next_point(&mut self, _config: &TestConfig) -> bool {
        false
    }

    fn point(&self) -> u16 {
        0
    }
}
