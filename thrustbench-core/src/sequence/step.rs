//! Sequence step transition table

/// Phase of an in-progress test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceStep {
    /// No run in progress
    #[default]
    Idle,
    /// Driving towards the current operating point
    RampUp,
    /// Holding the point while the airflow settles
    Stabilize,
    /// Accumulating the measurement window
    Measure,
    /// Idling the motor until it drops below the warning temperature
    Cooldown,
}

/// Inputs to the step table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepTrigger {
    /// First advance of a fresh run
    Start,
    /// The algorithm reports the point reached
    TargetReached,
    /// Settle time elapsed since entering Stabilize
    SettleElapsed,
    /// Window time elapsed since entering Measure
    WindowElapsed {
        /// Another operating point follows
        more_points: bool,
        /// Warning temperature active at finalize time
        warn_temp: bool,
    },
    /// Temperature back below the warning level
    Cooled,
    /// External reset; always wins
    Reset,
}

/// Side effect the sequencer applies on a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepEffect {
    None,
    /// Build the algorithm for the run's configuration
    LoadAlgorithm,
    /// Freeze the last ramp width for stabilize and measure
    StartSettle,
    /// Clear the accumulators and start the window timer
    OpenWindow,
    /// Emit the window record and continue
    CloseWindow,
    /// Emit the window record and report the run complete
    CloseWindowAndFinish,
    /// Leave cooldown; the pending point ramps again from the arm width
    ResumeRamp,
    /// Drop the algorithm and any partial window
    Discard,
}

impl SequenceStep {
    /// Look up the next step and its effect
    pub fn on(self, trigger: StepTrigger) -> (SequenceStep, StepEffect) {
        use SequenceStep::*;
        use StepTrigger::*;

        match (self, trigger) {
            (_, Reset) => (Idle, StepEffect::Discard),

            (Idle, Start) => (RampUp, StepEffect::LoadAlgorithm),
            (RampUp, TargetReached) => (Stabilize, StepEffect::StartSettle),
            (Stabilize, SettleElapsed) => (Measure, StepEffect::OpenWindow),

            (Measure, WindowElapsed { more_points: false, .. }) => {
                (Idle, StepEffect::CloseWindowAndFinish)
            }
            (Measure, WindowElapsed { warn_temp: true, .. }) => (Cooldown, StepEffect::CloseWindow),
            (Measure, WindowElapsed { .. }) => (RampUp, StepEffect::CloseWindow),

            (Cooldown, Cooled) => (RampUp, StepEffect::ResumeRamp),

            // Default: stay in current step
            _ => (self, StepEffect::None),
        }
    }
}
