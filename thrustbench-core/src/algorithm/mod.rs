//! Test algorithms
//!
//! Strategies the sequencer consults during ramp-up to pick the width for
//! the current operating point and to decide when it has been reached.

pub mod ramp;
pub mod seek;

pub use ramp::RampMap;
pub use seek::ThrustSeek;

use crate::config::{ActuatorLimits, SeekTuning, TestConfig, TestKind};
use crate::store::Snapshot;

/// Output of one algorithm step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlgorithmOutput {
    /// Proposed width, already clamped to the actuator limits
    pub command_us: u16,
    /// The operating point has been reached
    pub target_reached: bool,
}

/// Common contract of the test algorithms
///
/// Algorithms never fault: bad input means "not reached yet" and the last
/// valid command is held.
pub trait TestAlgorithm {
    /// Compute the command for the current operating point
    fn step(
        &mut self,
        snapshot: &Snapshot,
        config: &TestConfig,
        elapsed_ms: u32,
    ) -> AlgorithmOutput;

    /// Move to the next operating point; `false` when the run is complete
    fn next_point(&mut self, config: &TestConfig) -> bool;

    /// Zero-based index of the current operating point
    fn point(&self) -> u16;
}

/// The algorithm selected for a run
#[derive(Debug, Clone)]
pub enum Algorithm {
    Ramp(RampMap),
    Seek(ThrustSeek),
}

impl Algorithm {
    /// Build the algorithm for a test kind, `None` when no test is selected
    pub fn for_config(
        config: &TestConfig,
        limits: ActuatorLimits,
        tuning: SeekTuning,
    ) -> Option<Self> {
        match config.kind {
            TestKind::None => None,
            TestKind::RampMap => Some(Algorithm::Ramp(RampMap::new(limits))),
            TestKind::ConstantThrust => Some(Algorithm::Seek(ThrustSeek::new(
                config.pwm_start_us,
                limits,
                tuning,
            ))),
        }
    }
}

impl TestAlgorithm for Algorithm {
    fn step(
        &mut self,
        snapshot: &Snapshot,
        config: &TestConfig,
        elapsed_ms: u32,
    ) -> AlgorithmOutput {
        match self {
            Algorithm::Ramp(ramp) => ramp.step(snapshot, config, elapsed_ms),
            Algorithm::Seek(seek) => seek.step(snapshot, config, elapsed_ms),
        }
    }

    fn next_point(&mut self, config: &TestConfig) -> bool {
        match self {
            Algorithm::Ramp(ramp) => ramp.next_point(config),
            Algorithm::Seek(seek) => seek.next_point(config),
        }
    }

    fn point(&self) -> u16 {
        match self {
            Algorithm::Ramp(ramp) => ramp.point(),
            Algorithm::Seek(seek) => seek.point(),
        }
    }
}
