//! Telemetry payload types
//!
//! Everything on the wire is fixed-point: millivolts, milliamps, deciwatts,
//! tenths of a gram, tenths of a degree, microseconds.

use serde::{Deserialize, Serialize};

/// Top-level stand mode as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireMode {
    Boot,
    Ready,
    Running,
    Abort,
    Finished,
}

/// Active hard fault, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireFault {
    #[default]
    None,
    OverCurrent,
    OverTemp,
    UnderVoltage,
    SensorStale,
}

/// Sequencer step as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireStep {
    #[default]
    Idle,
    RampUp,
    Stabilize,
    Measure,
    Cooldown,
}

/// Live snapshot, sent on the display cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveTelemetry {
    /// Stand uptime at the end of the tick (ms)
    pub timestamp_ms: u32,
    pub mode: WireMode,
    pub fault: WireFault,
    pub step: WireStep,
    /// Pack voltage (mV)
    pub voltage_mv: i32,
    /// Pack current (mA)
    pub current_ma: i32,
    /// Electrical power (0.1 W)
    pub power_dw: i32,
    /// Unfiltered load-cell counts
    pub thrust_raw: i32,
    /// Filtered thrust (0.1 g)
    pub thrust_dg: i32,
    /// Motor/ESC temperature (0.1 °C)
    pub temperature_dc: i16,
    /// Width proposed by the sequencer (µs)
    pub command_us: u16,
    /// Width actually applied to the ESC (µs)
    pub actual_us: u16,
    pub armed: bool,
    /// Samples accumulated in the current measurement window
    pub sample_count: u16,
}

/// Aggregate of one finalized measurement window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowReport {
    pub timestamp_ms: u32,
    /// Zero-based operating point index within the run
    pub point: u16,
    pub command_us: u16,
    pub voltage_mv: i32,
    pub current_ma: i32,
    pub power_dw: i32,
    pub thrust_dg: i32,
    pub temperature_dc: i16,
    pub samples: u16,
}

/// Mode change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeReport {
    pub timestamp_ms: u32,
    pub mode: WireMode,
    pub fault: WireFault,
}

/// Scale a float to a rounded fixed-point integer
///
/// Non-finite input maps to zero; the live record then shows the value as
/// missing rather than as a saturated extreme.
pub fn to_fixed(value: f32, scale: f32) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let scaled = value * scale;
    let rounded = if scaled >= 0.0 {
        scaled + 0.5
    } else {
        scaled - 0.5
    };
    // `as` saturates at the i32 bounds
    rounded as i32
}
