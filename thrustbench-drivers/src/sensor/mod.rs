//! Sensor drivers
//!
//! Conversions (linear channels, thermistor, load cell) are plain
//! calibration types; [`AnalogFrontEnd`] owns the hardware and schedules
//! acquisitions.

pub mod frontend;
pub mod hx711;
pub mod linear;
pub mod loadcell;
pub mod ntc;

pub use frontend::{AnalogFrontEnd, FrontEndConfig};
pub use hx711::Hx711;
pub use linear::LinearChannel;
pub use loadcell::{LoadCell, LoadCellOutput};
pub use ntc::Thermistor;

use thrustbench_core::traits::SensorError;

/// Analog inputs sampled by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogInput {
    PackVoltage,
    Current,
    Temperature,
}

/// Single-shot ADC conversions for platform abstraction
pub trait AnalogReader {
    /// Read one conversion (12-bit, 0-4095)
    fn read(&mut self, input: AnalogInput) -> Result<u16, SensorError>;
}

/// Load cell amplifier with its own conversion rate
pub trait RawLoadCell {
    /// Latest conversion, `None` if none is ready yet
    fn read_raw(&mut self) -> Result<Option<i32>, SensorError>;
}
