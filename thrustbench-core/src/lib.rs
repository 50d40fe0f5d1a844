//! Board-agnostic control core for the motor thrust test stand
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (sensor source, ESC driver, telemetry sink)
//! - Shared state store with single-writer tick discipline
//! - Safety monitor (current, temperature, pack voltage, staleness)
//! - Test algorithms (ramp map, constant thrust seek)
//! - Test sequencer (ramp / stabilize / measure / cooldown)
//! - Top-level mode state machine
//! - The per-tick control pipeline tying them together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod algorithm;
pub mod config;
pub mod controller;
pub mod menu;
pub mod safety;
pub mod sequence;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod traits;

pub use controller::{ActuatorCommand, Controller, StartRejection, TickOutcome};
