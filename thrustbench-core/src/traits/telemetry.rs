//! Telemetry sink trait

use crate::sequence::WindowRecord;
use crate::state::Mode;
use crate::telemetry::LiveFrame;

/// Consumer of live snapshots and measurement results
///
/// Called after the tick's snapshot is finalized. Implementations must not
/// block; a full outbound queue drops the record.
pub trait TelemetrySink {
    /// Live snapshot, on the publish cadence
    fn publish(&mut self, live: &LiveFrame);

    /// Aggregate of one finalized measurement window
    fn record(&mut self, record: &WindowRecord);

    /// Mode changed during this tick
    fn mode_changed(&mut self, _now_ms: u32, _mode: Mode) {}
}
