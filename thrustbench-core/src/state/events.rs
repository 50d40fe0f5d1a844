//! Events that trigger mode transitions

use super::machine::FaultKind;

/// Events that can trigger mode transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Load cell tare finished
    BootComplete,
    /// Confirm edge with a valid configuration and a clear safety monitor
    Start,
    /// Safety monitor latched a hard fault
    SafetyFault(FaultKind),
    /// Sequencer finished its last operating point
    RunComplete,
    /// External reset after an abort
    Reset,
    /// Any input edge while finished
    Acknowledge,
}
