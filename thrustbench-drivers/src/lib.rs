//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the collaborator traits
//! defined in thrustbench-core:
//!
//! - ESC signal output over an `embedded-hal` PWM channel
//! - Sensor front-end (pack voltage, current, thermistor, load cell)
//! - Debounced front panel buttons

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod esc;
pub mod input;
pub mod sensor;
