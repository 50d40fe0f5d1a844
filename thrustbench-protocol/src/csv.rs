//! CSV rendering of live telemetry for serial logging
//!
//! One header line, then one row per live record. Fixed-point fields are
//! printed back in engineering units (V, A, W, g, °C).

use core::fmt::{self, Write};

use heapless::String;

use crate::messages::StandMessage;
use crate::telemetry::{LiveTelemetry, WireFault, WireMode, WireStep};

/// Room for the header plus one row
pub const CSV_LINE_CAPACITY: usize = 320;

/// Encoding used on the stand link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkFormat {
    /// Framed postcard messages, host commands accepted
    Binary,
    /// Plain-text CSV of live telemetry for a serial logger
    Csv,
}

/// Text rendering of the outbound stream
///
/// The header goes out in front of the first row. Only live telemetry
/// has a CSV form; other messages render to nothing.
#[derive(Debug, Default)]
pub struct CsvLog {
    header_sent: bool,
}

impl CsvLog {
    pub const fn new() -> Self {
        Self { header_sent: false }
    }

    /// Text for one outbound message, `None` when it has no CSV form
    pub fn render(
        &mut self,
        message: &StandMessage,
    ) -> Result<Option<String<CSV_LINE_CAPACITY>>, fmt::Error> {
        let StandMessage::Live(live) = message else {
            return Ok(None);
        };
        let mut line = String::new();
        if !self.header_sent {
            write_header(&mut line)?;
        }
        write_row(live, &mut line)?;
        self.header_sent = true;
        Ok(Some(line))
    }
}

/// Column header, without trailing newline
pub const CSV_HEADER: &str =
    "time_ms,mode,fault,step,voltage_v,current_a,power_w,thrust_raw,thrust_g,temp_c,command_us,pwm_us,armed,samples";

/// Write the header line
pub fn write_header<W: Write>(out: &mut W) -> fmt::Result {
    out.write_str(CSV_HEADER)?;
    out.write_char('\n')
}

/// Write one row for a live record, newline terminated
pub fn write_row<W: Write>(live: &LiveTelemetry, out: &mut W) -> fmt::Result {
    write!(
        out,
        "{},{},{},{},",
        live.timestamp_ms,
        mode_name(live.mode),
        fault_name(live.fault),
        step_name(live.step)
    )?;
    write_decimal(out, live.voltage_mv, 3)?;
    out.write_char(',')?;
    write_decimal(out, live.current_ma, 3)?;
    out.write_char(',')?;
    write_decimal(out, live.power_dw, 1)?;
    write!(out, ",{},", live.thrust_raw)?;
    write_decimal(out, live.thrust_dg, 1)?;
    out.write_char(',')?;
    write_decimal(out, i32::from(live.temperature_dc), 1)?;
    writeln!(
        out,
        ",{},{},{},{}",
        live.command_us,
        live.actual_us,
        u8::from(live.armed),
        live.sample_count
    )
}

/// Print a fixed-point integer with `decimals` fractional digits
fn write_decimal<W: Write>(out: &mut W, value: i32, decimals: u32) -> fmt::Result {
    let divisor = 10u32.pow(decimals);
    let magnitude = value.unsigned_abs();
    if value < 0 {
        out.write_char('-')?;
    }
    write!(
        out,
        "{}.{:0width$}",
        magnitude / divisor,
        magnitude % divisor,
        width = decimals as usize
    )
}

fn mode_name(mode: WireMode) -> &'static str {
    match mode {
        WireMode::Boot => "boot",
        WireMode::Ready => "ready",
        WireMode::Running => "running",
        WireMode::Abort => "abort",
        WireMode::Finished => "finished",
    }
}

fn fault_name(fault: WireFault) -> &'static str {
    match fault {
        WireFault::None => "",
        WireFault::OverCurrent => "over_current",
        WireFault::OverTemp => "over_temp",
        WireFault::UnderVoltage => "under_voltage",
        WireFault::SensorStale => "sensor_stale",
    }
}

fn step_name(step: WireStep) -> &'static str {
    match step {
        WireStep::Idle => "idle",
        WireStep::RampUp => "ramp_up",
        WireStep::Stabilize => "stabilize",
        WireStep::Measure => "measure",
        WireStep::Cooldown => "cooldown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::ModeReport;

    fn sample() -> LiveTelemetry {
        LiveTelemetry {
            timestamp_ms: 42_100,
            mode: WireMode::Running,
            fault: WireFault::None,
            step: WireStep::Measure,
            voltage_mv: 24_870,
            current_ma: 3_050,
            power_dw: 759,
            thrust_raw: -100_200,
            thrust_dg: 5_012,
            temperature_dc: 415,
            command_us: 1_300,
            actual_us: 1_300,
            armed: true,
            sample_count: 12,
        }
    }

    #[test]
    fn test_header_column_count_matches_row() {
        let mut row: String<256> = String::new();
        write_row(&sample(), &mut row).unwrap();

        let header_cols = CSV_HEADER.split(',').count();
        let row_cols = row.trim_end().split(',').count();
        assert_eq!(header_cols, row_cols);
    }

    #[test]
    fn test_row_units() {
        let mut row: String<256> = String::new();
        write_row(&sample(), &mut row).unwrap();
        assert_eq!(
            row.as_str(),
            "42100,running,,measure,24.870,3.050,75.9,-100200,501.2,41.5,1300,1300,1,12\n"
        );
    }

    #[test]
    fn test_negative_fraction_keeps_sign() {
        let mut out: String<16> = String::new();
        write_decimal(&mut out, -5, 1).unwrap();
        assert_eq!(out.as_str(), "-0.5");
    }

    #[test]
    fn test_abort_row_names_fault() {
        let mut live = sample();
        live.mode = WireMode::Abort;
        live.fault = WireFault::OverTemp;
        live.armed = false;

        let mut row: String<256> = String::new();
        write_row(&live, &mut row).unwrap();
        assert!(row.starts_with("42100,abort,over_temp,"));
        assert!(row.ends_with(",0,12\n"));
    }

    #[test]
    fn test_header_line() {
        let mut out: String<256> = String::new();
        write_header(&mut out).unwrap();
        assert!(out.starts_with("time_ms,"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_log_sends_header_once() {
        let mut log = CsvLog::new();
        let first = log.render(&StandMessage::Live(sample())).unwrap().unwrap();
        assert!(first.starts_with(CSV_HEADER));
        assert!(first.ends_with(",1,12\n"));
        assert_eq!(first.lines().count(), 2);

        let second = log.render(&StandMessage::Live(sample())).unwrap().unwrap();
        assert!(second.starts_with("42100,running,"));
        assert_eq!(second.lines().count(), 1);
    }

    #[test]
    fn test_log_skips_non_live_messages() {
        let mut log = CsvLog::new();
        assert_eq!(log.render(&StandMessage::Pong), Ok(None));
        let mode = ModeReport {
            timestamp_ms: 10,
            mode: WireMode::Ready,
            fault: WireFault::None,
        };
        assert_eq!(log.render(&StandMessage::Mode(mode)), Ok(None));

        // Header still pending for the first live row
        let line = log.render(&StandMessage::Live(sample())).unwrap().unwrap();
        assert!(line.starts_with("time_ms,"));
    }
}
