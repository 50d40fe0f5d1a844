//! Message types for the stand link
//!
//! Message types are divided into two categories:
//! - Host → Stand: input edges, heartbeat requests
//! - Stand → Host: live telemetry, window aggregates, mode changes, heartbeat responses

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::events::InputEvent;
use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use crate::telemetry::{LiveTelemetry, ModeReport, WindowReport};

// Message type IDs: Host → Stand
pub const MSG_INPUT: u8 = 0x01;
pub const MSG_PING: u8 = 0x02;

// Message type IDs: Stand → Host
pub const MSG_LIVE: u8 = 0x40;
pub const MSG_WINDOW: u8 = 0x41;
pub const MSG_MODE: u8 = 0x42;
pub const MSG_PONG: u8 = 0x43;

fn encode_payload<T: Serialize>(msg_type: u8, seq: u8, value: &T) -> Result<Frame, FrameError> {
    let mut buf = [0u8; MAX_PAYLOAD_SIZE];
    let used = postcard::to_slice(value, &mut buf).map_err(|_| FrameError::Encode)?;
    Frame::new(msg_type, seq, used)
}

fn decode_payload<T: DeserializeOwned>(frame: &Frame) -> Result<T, FrameError> {
    postcard::from_bytes(&frame.payload).map_err(|_| FrameError::Decode)
}

/// Messages from the stand to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StandMessage {
    /// Periodic live snapshot
    Live(LiveTelemetry),
    /// One finalized measurement window
    Window(WindowReport),
    /// Mode transition
    Mode(ModeReport),
    /// Heartbeat response
    Pong,
}

impl StandMessage {
    /// Encode this message into a frame
    pub fn to_frame(&self, seq: u8) -> Result<Frame, FrameError> {
        match self {
            StandMessage::Live(live) => encode_payload(MSG_LIVE, seq, live),
            StandMessage::Window(window) => encode_payload(MSG_WINDOW, seq, window),
            StandMessage::Mode(mode) => encode_payload(MSG_MODE, seq, mode),
            StandMessage::Pong => Ok(Frame::empty(MSG_PONG, seq)),
        }
    }

    /// Parse a stand message (host side)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_LIVE => decode_payload(frame).map(StandMessage::Live),
            MSG_WINDOW => decode_payload(frame).map(StandMessage::Window),
            MSG_MODE => decode_payload(frame).map(StandMessage::Mode),
            MSG_PONG => Ok(StandMessage::Pong),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

/// Commands parsed from host-originated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Input edge, treated exactly like a button press
    Input(InputEvent),
    /// Heartbeat request
    Ping,
}

impl HostCommand {
    /// Parse a command from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_INPUT => {
                let byte = frame.payload.first().ok_or(FrameError::InvalidFrame)?;
                InputEvent::from_byte(*byte)
                    .map(HostCommand::Input)
                    .ok_or(FrameError::InvalidFrame)
            }
            MSG_PING => Ok(HostCommand::Ping),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this command into a frame (host side and tests)
    pub fn to_frame(&self, seq: u8) -> Result<Frame, FrameError> {
        match self {
            HostCommand::Input(event) => Frame::new(MSG_INPUT, seq, &[event.to_byte()]),
            HostCommand::Ping => Ok(Frame::empty(MSG_PING, seq)),
        }
    }
}
