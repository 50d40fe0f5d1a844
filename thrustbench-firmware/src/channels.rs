//! Inter-task communication channels
//!
//! The control loop never waits on the link: it only `try_send`s outbound
//! telemetry and `try_receive`s host input.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use thrustbench_protocol::{InputEvent, StandMessage};

/// Channel capacity for host input edges
const INPUT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outbound telemetry
const OUTBOUND_CHANNEL_SIZE: usize = 16;

/// Input edges received from the host link
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, InputEvent, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Telemetry waiting for the link TX task
pub static OUTBOUND_CHANNEL: Channel<CriticalSectionRawMutex, StandMessage, OUTBOUND_CHANNEL_SIZE> =
    Channel::new();

/// Signal that a heartbeat (PING) was received from the host
pub static PONG_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
