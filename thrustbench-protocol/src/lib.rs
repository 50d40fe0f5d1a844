//! Stand link protocol
//!
//! This crate defines the serial link between the test stand controller and
//! a host (Bluetooth SPP bridge, USB-UART logger, bench PC). The stand
//! streams live telemetry and one aggregate record per measurement window;
//! the host can send the same input edges as the physical buttons.
//!
//! # Protocol Overview
//!
//! All messages use a binary frame format:
//! ```text
//! ┌──────┬────────┬──────┬─────┬─────────────┬──────┐
//! │ SYNC │ LENGTH │ TYPE │ SEQ │ PAYLOAD     │ CRC8 │
//! │ 1B   │ 1B     │ 1B   │ 1B  │ 0–96B       │ 1B   │
//! └──────┴────────┴──────┴─────┴─────────────┴──────┘
//! ```
//!
//! Payloads are postcard-encoded structs in fixed-point integer units so
//! the host never has to agree on float layout.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod csv;
pub mod events;
pub mod frame;
pub mod messages;
pub mod telemetry;

pub use csv::{CsvLog, LinkFormat};
pub use events::InputEvent;
pub use frame::{Frame, FrameError, FrameParser, FRAME_SYNC, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{HostCommand, StandMessage};
pub use telemetry::{LiveTelemetry, ModeReport, WindowReport, WireFault, WireMode, WireStep};
