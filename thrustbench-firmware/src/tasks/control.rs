//! Control loop task
//!
//! Runs one controller tick per period. Every tick reads the front panel
//! (falling back to host input), drains the sensor front-end, writes the
//! ESC exactly once and hands telemetry to the link.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::pwm::PwmOutput;
use embassy_time::{Delay, Duration, Instant, Ticker};

use thrustbench_core::state::Mode;
use thrustbench_core::traits::EscDriver;
use thrustbench_core::{Controller, TickOutcome};
use thrustbench_drivers::esc::PwmEsc;
use thrustbench_drivers::input::InputPanel;
use thrustbench_drivers::sensor::{AnalogFrontEnd, Hx711};

use crate::board::BoardAdc;
use crate::channels::INPUT_CHANNEL;
use crate::telemetry::LinkSink;

pub type StandSensors = AnalogFrontEnd<BoardAdc, Hx711<Input<'static>, Output<'static>, Delay>>;
pub type StandEsc = PwmEsc<PwmOutput<'static>>;
pub type StandPanel = InputPanel<Input<'static>, Input<'static>, Input<'static>>;

#[embassy_executor::task]
pub async fn control_task(
    mut controller: Controller,
    mut sensors: StandSensors,
    mut esc: StandEsc,
    mut panel: StandPanel,
) {
    let tick_ms = controller.config().timing.tick_ms;
    info!("Control task started ({} ms tick)", tick_ms);

    let mut sink = LinkSink::new();
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(tick_ms)));
    let start = Instant::now();
    let mut write_errors = 0;

    loop {
        ticker.next().await;

        // Wraps after ~49 days; all tick arithmetic is wrapping
        let now_ms = start.elapsed().as_millis() as u32;
        let input = panel.poll().or_else(|| INPUT_CHANNEL.try_receive().ok());
        if let Some(event) = input {
            debug!("Input: {:?}", event);
        }

        match controller.tick(now_ms, &mut sensors, input, &mut esc, &mut sink) {
            Ok(outcome) => report(now_ms, &outcome),
            Err(e) => {
                error!("Tick failed: {:?}, stopping ESC", e);
                esc.emergency_stop();
            }
        }

        if esc.write_errors() != write_errors {
            write_errors = esc.write_errors();
            warn!("ESC PWM write failed ({} total)", write_errors);
        }
    }
}

fn report(now_ms: u32, outcome: &TickOutcome) {
    if outcome.mode_changed() {
        match outcome.mode {
            Mode::Abort(fault) => error!("[{}] ABORT: {:?}", now_ms, fault),
            mode => info!("[{}] Mode: {:?} -> {:?}", now_ms, outcome.previous, mode),
        }
    }
    if let Some(record) = &outcome.record {
        debug!(
            "Point {}: {} us, {} g, {} W",
            record.point, record.command_us, record.thrust_g, record.power_w
        );
    }
    if let Some(rejection) = &outcome.rejection {
        debug!("Start refused: {:?}", rejection);
    }
    if outcome.sensor_failures > 0 {
        warn!("{} sensor reads failed", outcome.sensor_failures);
    }
    if outcome.rejected_samples > 0 {
        warn!("{} non-finite samples dropped", outcome.rejected_samples);
    }
    trace!("Tick {}: {:?}", now_ms, outcome.command);
}
