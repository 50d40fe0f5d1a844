//! Thrustbench - Motor Thrust Test Stand Firmware
//!
//! Firmware binary for the RP2040 stand controller. Stand limits and test
//! presets are compiled in from stand.toml; the control loop, sensor
//! front-end and host link run as separate Embassy tasks.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use thrustbench_core::Controller;
use thrustbench_drivers::esc::{PwmEsc, FRAME_PERIOD_US};
use thrustbench_drivers::input::{Button, InputPanel};
use thrustbench_drivers::sensor::{AnalogFrontEnd, Hx711};

use crate::board::BoardAdc;
use crate::config::{LINK_FORMAT, PRESETS, STAND_CONFIG};

mod board;
mod channels;
mod config;
mod tasks;
mod telemetry;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// PWM counter clock divider: 125 MHz system clock down to 1 MHz, 1 count per µs
const PWM_DIVIDER: u8 = 125;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Thrustbench firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut controller = match Controller::new(STAND_CONFIG) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Stand configuration rejected: {:?}", e);
            return;
        }
    };
    if let Err(e) = controller.menu_mut().replace(&PRESETS) {
        warn!("Presets rejected, using built-in test: {:?}", e);
    }
    info!("{} test presets loaded", controller.menu().presets().len());

    // Host link (115200 baud default)
    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 128]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("UART initialized for host link");

    // ESC signal: one count per µs, 20 ms frame. Compare starts at 0 so no
    // pulses reach the ESC until the controller writes one.
    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = PWM_DIVIDER.into();
    pwm_config.top = FRAME_PERIOD_US - 1;
    pwm_config.compare_a = 0;
    let pwm = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm_config);
    let (esc_output, _) = pwm.split();
    let Some(esc_output) = esc_output else {
        error!("ESC PWM output unavailable");
        return;
    };
    let esc = PwmEsc::new(esc_output, STAND_CONFIG.actuator);
    info!("ESC output initialized");

    // Sensors
    let adc = BoardAdc::new(
        Adc::new_blocking(p.ADC, adc::Config::default()),
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
        Channel::new_pin(p.PIN_28, Pull::None),
    );
    let amplifier = Hx711::new(
        Input::new(p.PIN_2, Pull::None),
        Output::new(p.PIN_3, Level::Low),
        Delay,
    );
    let sensors = AnalogFrontEnd::new(adc, amplifier, config::front_end());
    info!("Sensor front-end initialized");

    // Front panel, buttons to ground
    let panel = InputPanel::new(
        Button::new(Input::new(p.PIN_10, Pull::Up)),
        Button::new(Input::new(p.PIN_11, Pull::Up)),
        Button::new(Input::new(p.PIN_12, Pull::Up)),
    );

    unwrap!(spawner.spawn(tasks::link_rx_task(rx)));
    unwrap!(spawner.spawn(tasks::link_tx_task(tx, LINK_FORMAT)));
    unwrap!(spawner.spawn(tasks::control_task(controller, sensors, esc, panel)));

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
