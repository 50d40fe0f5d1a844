//! Test sequencing
//!
//! Sub-state machine of a running test: ramp-up, stabilize, measure and
//! cooldown, plus the measurement window it accumulates.

pub mod sequencer;
pub mod step;
pub mod window;

pub use sequencer::{Advance, Sequencer};
pub use step::{SequenceStep, StepEffect, StepTrigger};
pub use window::{WindowAccumulator, WindowRecord};
