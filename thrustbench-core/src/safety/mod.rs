//! Safety monitoring
//!
//! Detects hard fault conditions for the mode state machine to act on.

pub mod monitor;

pub use monitor::{SafetyMonitor, SafetyStatus};
