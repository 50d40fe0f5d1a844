//! Configuration types
//!
//! Stand-wide tuning (limits, timing, gains) and the per-run test
//! configuration chosen by the operator.

pub mod stand;
pub mod run;

pub use stand::*;
pub use run::*;

/// Reasons a configuration is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Test kind is `None`
    NoTestSelected,
    /// Ramp increment is zero
    EmptyRampStep,
    /// Ramp end lies below ramp start
    InvertedRange,
    /// A commanded width lies outside the actuator limits
    OutOfActuatorRange,
    /// Thrust target is zero, negative or not a number
    NonPositiveTarget,
    /// Actuator minimum is not below its maximum
    ActuatorRange,
    /// Arm or safe stop width lies outside the actuator limits
    SentinelOutOfRange,
    /// Warning temperature is not below the critical temperature
    WarnAboveCritical,
    /// A safety threshold is zero, negative or not a number
    InvalidThreshold,
    /// A debounce window of zero ticks
    ZeroDebounce,
    /// A duration or interval of zero
    ZeroDuration,
    /// Seek gain or tolerance is not positive
    InvalidGain,
    /// Load cell factor or filter constant is out of range
    InvalidFilter,
    /// Test menu would be left empty
    NoPresets,
    /// Test menu capacity exceeded
    TooManyPresets,
}
