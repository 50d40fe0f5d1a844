//! Stand configuration compiled in from stand.toml
//!
//! build.rs validates stand.toml and generates the constants included
//! here; nothing is read or persisted at runtime.

use thrustbench_core::config::{
    ActuatorLimits, LoadCellConfig, SafetyLimits, SeekTuning, SequenceTiming, StandConfig,
    TelemetryTiming, TestConfig,
};
use thrustbench_drivers::sensor::{FrontEndConfig, LinearChannel, Thermistor};
use thrustbench_protocol::LinkFormat;

include!(concat!(env!("OUT_DIR"), "/stand_config.rs"));

/// Sensor front-end calibration for this board
pub fn front_end() -> FrontEndConfig {
    FrontEndConfig {
        voltage: LinearChannel::divider(DIVIDER_RATIO),
        current: LinearChannel::hall_current(CURRENT_MV_PER_AMP),
        thermistor: Thermistor {
            pullup_ohms: NTC_PULLUP_OHMS,
            ..Thermistor::default()
        },
        load_cell: STAND_CONFIG.load_cell,
        power_interval_ms: STAND_CONFIG.timing.tick_ms,
        temperature_interval_ms: TEMPERATURE_INTERVAL_MS,
        ..FrontEndConfig::default()
    }
}
