//! Embassy async tasks
//!
//! The control task owns the stand hardware; the link tasks only move
//! bytes and talk to it through channels.

pub mod control;
pub mod link_rx;
pub mod link_tx;

pub use control::{control_task, StandEsc, StandPanel, StandSensors};
pub use link_rx::link_rx_task;
pub use link_tx::link_tx_task;
