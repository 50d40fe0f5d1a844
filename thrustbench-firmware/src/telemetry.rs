//! Telemetry sink feeding the link TX task

use defmt::*;

use thrustbench_core::sequence::WindowRecord;
use thrustbench_core::state::Mode;
use thrustbench_core::telemetry::{mode_report, LiveFrame};
use thrustbench_core::traits::TelemetrySink;
use thrustbench_protocol::StandMessage;

use crate::channels::OUTBOUND_CHANNEL;

/// Queues stand messages for the link, dropping them when the link lags
pub struct LinkSink {
    dropped: u32,
}

impl LinkSink {
    pub const fn new() -> Self {
        Self { dropped: 0 }
    }

    fn send(&mut self, message: StandMessage) {
        if OUTBOUND_CHANNEL.try_send(message).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            warn!("Outbound channel full, dropped {} messages", self.dropped);
        }
    }
}

impl TelemetrySink for LinkSink {
    fn publish(&mut self, frame: &LiveFrame) {
        self.send(StandMessage::Live(frame.to_wire()));
    }

    fn record(&mut self, record: &WindowRecord) {
        self.send(StandMessage::Window(record.to_wire()));
    }

    fn mode_changed(&mut self, now_ms: u32, mode: Mode) {
        self.send(StandMessage::Mode(mode_report(now_ms, mode)));
    }
}
