//! Top-level mode state machine
//!
//! Explicit, finite and deterministic: mode × event → mode × effect.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{Effect, FaultKind, Mode, Transition};
