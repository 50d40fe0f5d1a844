//! Collaborator traits
//!
//! These traits define the interface between the control core and the
//! sensor, actuator and telemetry implementations.

pub mod actuator;
pub mod sensor;
pub mod telemetry;

pub use actuator::EscDriver;
pub use sensor::{SensorError, SensorEvent, SensorSample, SensorSource};
pub use telemetry::TelemetrySink;
