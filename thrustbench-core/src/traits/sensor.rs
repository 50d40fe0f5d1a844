//! Sensor source trait

use crate::store::Channel;

/// Errors a sensor driver can report for one acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// ADC conversion failed
    ConversionError,
    /// Sensor disconnected (open circuit)
    OpenCircuit,
    /// Sensor shorted
    ShortCircuit,
    /// Reading outside the sensor's physical range
    OutOfRange,
}

/// One reading in engineering units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorSample {
    /// Pack voltage (V) and current (A), sampled together
    Power { voltage_v: f32, current_a: f32 },
    /// Load cell counts and tared, filtered thrust (g)
    Thrust { raw: i32, grams: f32 },
    /// Motor/ESC temperature (°C)
    Temperature { celsius: f32 },
}

impl SensorSample {
    /// Channel this sample refreshes
    pub fn channel(&self) -> Channel {
        match self {
            SensorSample::Power { .. } => Channel::Power,
            SensorSample::Thrust { .. } => Channel::Thrust,
            SensorSample::Temperature { .. } => Channel::Temperature,
        }
    }
}

/// Output of one sensor poll
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorEvent {
    /// A new reading is available
    Sample(SensorSample),
    /// Zero-reference sensors finished their tare; reported once
    TareComplete,
    /// An acquisition failed; the channel keeps its previous value
    Failed(Channel, SensorError),
}

/// Non-blocking source of sensor readings
///
/// Implementations run their own acquisition cycle and hand out whatever
/// is ready. The controller polls repeatedly each tick until `None`.
pub trait SensorSource {
    /// Next pending event, or `None` if nothing new since the last poll
    ///
    /// Must never block.
    fn poll(&mut self, now_ms: u32) -> Option<SensorEvent>;
}
