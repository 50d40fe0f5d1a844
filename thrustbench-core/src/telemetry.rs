//! Conversion of core state to wire telemetry

use thrustbench_protocol::telemetry::to_fixed;
use thrustbench_protocol::{LiveTelemetry, ModeReport, WindowReport, WireFault, WireMode, WireStep};

use crate::sequence::{SequenceStep, WindowRecord};
use crate::state::{FaultKind, Mode};
use crate::store::Snapshot;

/// Live record handed to the telemetry sink
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LiveFrame {
    pub mode: Mode,
    pub snapshot: Snapshot,
}

impl From<Mode> for WireMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Boot => WireMode::Boot,
            Mode::Ready => WireMode::Ready,
            Mode::Running => WireMode::Running,
            Mode::Abort(_) => WireMode::Abort,
            Mode::Finished => WireMode::Finished,
        }
    }
}

impl From<FaultKind> for WireFault {
    fn from(kind: FaultKind) -> Self {
        match kind {
            FaultKind::OverCurrent => WireFault::OverCurrent,
            FaultKind::OverTemp => WireFault::OverTemp,
            FaultKind::UnderVoltage => WireFault::UnderVoltage,
            FaultKind::SensorStale => WireFault::SensorStale,
        }
    }
}

impl From<SequenceStep> for WireStep {
    fn from(step: SequenceStep) -> Self {
        match step {
            SequenceStep::Idle => WireStep::Idle,
            SequenceStep::RampUp => WireStep::RampUp,
            SequenceStep::Stabilize => WireStep::Stabilize,
            SequenceStep::Measure => WireStep::Measure,
            SequenceStep::Cooldown => WireStep::Cooldown,
        }
    }
}

fn wire_fault(mode: Mode) -> WireFault {
    mode.fault().map_or(WireFault::None, WireFault::from)
}

fn deci_i16(value: f32) -> i16 {
    to_fixed(value, 10.0).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

impl LiveFrame {
    /// Fixed-point wire form
    pub fn to_wire(&self) -> LiveTelemetry {
        let s = &self.snapshot;
        LiveTelemetry {
            timestamp_ms: s.timestamp_ms,
            mode: self.mode.into(),
            fault: wire_fault(self.mode),
            step: s.step.into(),
            voltage_mv: to_fixed(s.voltage_v, 1000.0),
            current_ma: to_fixed(s.current_a, 1000.0),
            power_dw: to_fixed(s.power_w, 10.0),
            thrust_raw: s.thrust_raw,
            thrust_dg: to_fixed(s.thrust_g, 10.0),
            temperature_dc: deci_i16(s.temperature_c),
            command_us: s.command_us,
            actual_us: s.actual_us,
            armed: s.armed,
            sample_count: s.sample_count,
        }
    }
}

impl WindowRecord {
    /// Fixed-point wire form
    pub fn to_wire(&self) -> WindowReport {
        WindowReport {
            timestamp_ms: self.timestamp_ms,
            point: self.point,
            command_us: self.command_us,
            voltage_mv: to_fixed(self.voltage_v, 1000.0),
            current_ma: to_fixed(self.current_a, 1000.0),
            power_dw: to_fixed(self.power_w, 10.0),
            thrust_dg: to_fixed(self.thrust_g, 10.0),
            temperature_dc: deci_i16(self.temperature_c),
            samples: self.samples,
        }
    }
}

/// Mode change notification
pub fn mode_report(now_ms: u32, mode: Mode) -> ModeReport {
    ModeReport {
        timestamp_ms: now_ms,
        mode: mode.into(),
        fault: wire_fault(mode),
    }
}
