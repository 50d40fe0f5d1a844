//! Top-level mode state machine
//!
//! Every mode change is a function of the current mode and an event, and
//! yields the side effect the controller must apply in the same tick.

use super::events::Event;

/// Top-level operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Power-on; waiting for the load cell tare
    Boot,
    /// Armed at idle width, test selectable
    Ready,
    /// Test sequence executing
    Running,
    /// Hard fault; actuator held at safe stop until reset
    Abort(FaultKind),
    /// Run completed; waiting for acknowledge
    Finished,
}

/// Hard safety faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Current at or above the absolute limit
    OverCurrent,
    /// Temperature at or above the critical limit
    OverTemp,
    /// Pack voltage at or below the minimum
    UnderVoltage,
    /// A sensor channel stopped delivering readings
    SensorStale,
}

/// Side effect of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    None,
    /// Arm the ESC for the first time
    Arm,
    /// Latch the selected test and reset the sequencer
    BeginRun,
    /// Force the actuator to safe stop and discard the run
    SafeStop,
    /// Clear the safety latch and re-arm after an abort
    Rearm,
    /// Run over; return the actuator to idle width
    Idle,
}

/// Result of applying an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub next: Mode,
    pub effect: Effect,
}

impl Transition {
    const fn to(next: Mode, effect: Effect) -> Self {
        Self { next, effect }
    }
}

impl Mode {
    /// Check if the ESC may be driven above safe stop
    pub fn actuator_enabled(&self) -> bool {
        matches!(self, Mode::Ready | Mode::Running | Mode::Finished)
    }

    /// Check if this is the abort mode
    pub fn is_abort(&self) -> bool {
        matches!(self, Mode::Abort(_))
    }

    /// Fault carried by the abort mode
    pub fn fault(&self) -> Option<FaultKind> {
        match self {
            Mode::Abort(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Process an event and return the next mode with its side effect
    pub fn transition(self, event: Event) -> Transition {
        use Event::*;
        use Mode::*;

        match (self, event) {
            // Boot transitions
            (Boot, BootComplete) => Transition::to(Ready, Effect::Arm),

            // Ready transitions
            (Ready, Start) => Transition::to(Running, Effect::BeginRun),
            (Ready, SafetyFault(kind)) => Transition::to(Abort(kind), Effect::SafeStop),

            // Running transitions
            (Running, SafetyFault(kind)) => Transition::to(Abort(kind), Effect::SafeStop),
            (Running, RunComplete) => Transition::to(Finished, Effect::Idle),

            // Finished transitions
            (Finished, Acknowledge) => Transition::to(Ready, Effect::None),
            (Finished, SafetyFault(kind)) => Transition::to(Abort(kind), Effect::SafeStop),

            // Abort transitions: repeated faults keep the first kind
            (Abort(_), SafetyFault(_)) => Transition::to(self, Effect::SafeStop),
            (Abort(_), Reset) => Transition::to(Ready, Effect::Rearm),

            // Default: stay in current mode
            _ => Transition::to(self, Effect::None),
        }
    }
}
