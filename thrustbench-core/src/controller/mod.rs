//! Control pipeline coordinating store, safety, mode machine and sequencer
//!
//! One call to [`Controller::tick`] runs the whole per-tick pipeline in a
//! fixed order:
//! 1. sensor ingestion into the store
//! 2. safety evaluation
//! 3. mode transitions (tare, faults, input edges)
//! 4. sequencer step, only while Running
//! 5. exactly one actuator write
//! 6. snapshot finalize
//! 7. telemetry publication from the finalized snapshot

use thrustbench_protocol::InputEvent;

use crate::config::{ConfigError, StandConfig, TestConfig};
use crate::menu::TestMenu;
use crate::safety::{SafetyMonitor, SafetyStatus};
use crate::sequence::{Sequencer, WindowRecord};
use crate::state::{Effect, Event, Mode};
use crate::store::{Snapshot, StateStore, StoreError};
use crate::telemetry::LiveFrame;
use crate::traits::{EscDriver, SensorEvent, SensorSource, TelemetrySink};

#[cfg(test)]
mod scenarios;

/// Upper bound on sensor events drained per tick
pub const MAX_SENSOR_EVENTS_PER_TICK: usize = 8;

/// Why a confirm edge did not start a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartRejection {
    /// Selected configuration failed validation
    InvalidConfig(ConfigError),
    /// A safety condition is latched or still debouncing
    SafetyNotClear,
}

/// The single actuator write of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorCommand {
    /// Write the arm width
    Arm,
    /// Write a width already clamped to the actuator limits
    Pulse(u16),
    /// Write the safe stop width
    SafeStop,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// Mode before the tick
    pub previous: Mode,
    /// Mode after the tick
    pub mode: Mode,
    pub safety: SafetyStatus,
    pub command: ActuatorCommand,
    /// Window finalized on this tick
    pub record: Option<WindowRecord>,
    /// Confirm edge refused in Ready
    pub rejection: Option<StartRejection>,
    /// Live snapshot handed to the sink on this tick
    pub published: bool,
    /// Samples dropped as non-finite
    pub rejected_samples: u8,
    /// Acquisitions the sensor source reported as failed
    pub sensor_failures: u8,
}

impl TickOutcome {
    /// Check if the mode changed during this tick
    pub fn mode_changed(&self) -> bool {
        self.previous != self.mode
    }
}

/// Controller state for coordinating subsystems
pub struct Controller {
    config: StandConfig,
    mode: Mode,
    store: StateStore,
    safety: SafetyMonitor,
    sequencer: Sequencer,
    menu: TestMenu,
    /// Configuration latched at run start
    active: TestConfig,
    tare_complete: bool,
    reset_pending: bool,
    /// Set by Arm/Rearm effects, consumed by the actuator phase
    arm_pending: bool,
    last_publish_ms: Option<u32>,
}

impl Controller {
    /// Create a controller in Boot
    pub fn new(config: StandConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            mode: Mode::Boot,
            store: StateStore::new(),
            safety: SafetyMonitor::new(config.safety),
            sequencer: Sequencer::new(config.actuator, config.timing, config.seek),
            menu: TestMenu::new(),
            active: TestConfig::default(),
            tare_complete: false,
            reset_pending: false,
            arm_pending: false,
            last_publish_ms: None,
        })
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Snapshot as of the last finalized tick
    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    /// Shared state store
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Stand configuration
    pub fn config(&self) -> &StandConfig {
        &self.config
    }

    /// Configuration of the current or last run
    pub fn active_test(&self) -> &TestConfig {
        &self.active
    }

    pub fn menu(&self) -> &TestMenu {
        &self.menu
    }

    /// Menu access for a host replacing presets
    ///
    /// A running test keeps its own copy of the configuration.
    pub fn menu_mut(&mut self) -> &mut TestMenu {
        &mut self.menu
    }

    pub fn safety(&self) -> &SafetyMonitor {
        &self.safety
    }

    /// Request an external reset, applied on the next tick
    ///
    /// Clears the safety latch and returns Abort to Ready. Ignored in any
    /// other mode.
    pub fn reset(&mut self) {
        self.reset_pending = true;
    }

    /// Run one control tick
    pub fn tick<S, E, T>(
        &mut self,
        now_ms: u32,
        sensors: &mut S,
        input: Option<InputEvent>,
        esc: &mut E,
        sink: &mut T,
    ) -> Result<TickOutcome, StoreError>
    where
        S: SensorSource,
        E: EscDriver,
        T: TelemetrySink,
    {
        self.store.begin_tick(now_ms)?;
        let previous = self.mode;

        // 1. Ingestion
        let (rejected_samples, sensor_failures) = self.ingest(now_ms, sensors);

        // 2. Safety; not evaluated before the sensors are tared
        let safety = if self.mode == Mode::Boot {
            SafetyStatus::Ok
        } else {
            self.safety
                .evaluate(self.store.working(), self.store.freshness(), now_ms)
        };

        // 3. Mode transitions
        let rejection = self.update_mode(safety, input);

        // 4. Sequencer
        let mut record = None;
        let mut proposed = self.config.actuator.arm_us;
        if self.mode == Mode::Running {
            let warn_temp = self.safety.warn_active(self.store.working());
            let advance =
                self.sequencer
                    .advance(self.store.working(), &self.active, now_ms, warn_temp);
            proposed = advance.command_us;
            record = advance.record;
            if advance.complete {
                self.transition(Event::RunComplete);
            }
        }

        // 5. Actuator
        let command = self.actuator_command(proposed);
        self.store.set_command(self.command_width(command))?;
        match command {
            ActuatorCommand::Arm => esc.arm(),
            ActuatorCommand::Pulse(us) => esc.set_pulse_us(us),
            ActuatorCommand::SafeStop => esc.emergency_stop(),
        }
        self.store
            .set_actuator(esc.pulse_us(), self.mode.actuator_enabled())?;
        self.store
            .set_sequence(self.sequencer.step(), self.sequencer.samples())?;

        // 6. Finalize
        let snapshot = *self.store.finalize_tick()?;

        // 7. Publish
        if let Some(record) = &record {
            sink.record(record);
        }
        if self.mode != previous {
            sink.mode_changed(now_ms, self.mode);
        }
        let published = self.publish_due(now_ms);
        if published {
            sink.publish(&LiveFrame {
                mode: self.mode,
                snapshot,
            });
            self.last_publish_ms = Some(now_ms);
        }

        Ok(TickOutcome {
            previous,
            mode: self.mode,
            safety,
            command,
            record,
            rejection,
            published,
            rejected_samples,
            sensor_failures,
        })
    }

    /// Drain pending sensor events into the store
    fn ingest<S: SensorSource>(&mut self, now_ms: u32, sensors: &mut S) -> (u8, u8) {
        let mut rejected = 0u8;
        let mut failures = 0u8;

        for _ in 0..MAX_SENSOR_EVENTS_PER_TICK {
            let Some(event) = sensors.poll(now_ms) else {
                break;
            };
            match event {
                SensorEvent::Sample(sample) => {
                    if self.store.ingest(sample).is_err() {
                        rejected = rejected.saturating_add(1);
                    }
                }
                SensorEvent::TareComplete => self.tare_complete = true,
                SensorEvent::Failed(..) => failures = failures.saturating_add(1),
            }
        }

        (rejected, failures)
    }

    fn update_mode(
        &mut self,
        safety: SafetyStatus,
        input: Option<InputEvent>,
    ) -> Option<StartRejection> {
        if self.mode == Mode::Boot {
            if self.tare_complete {
                self.transition(Event::BootComplete);
            }
            // Edges wait until safety has evaluated at least one Ready tick
            self.reset_pending = false;
            return None;
        }

        let fault = match safety {
            SafetyStatus::Fault(kind) => Some(kind),
            _ => None,
        };

        let reset =
            core::mem::take(&mut self.reset_pending) || input == Some(InputEvent::Reset);
        if reset && self.mode.is_abort() {
            self.safety.clear();
            self.transition(Event::Reset);
            return None;
        }

        if let Some(kind) = fault {
            self.transition(Event::SafetyFault(kind));
            return None;
        }

        input.and_then(|input| self.process_input(input))
    }

    /// Process an input edge
    fn process_input(&mut self, input: InputEvent) -> Option<StartRejection> {
        match (self.mode, input) {
            (Mode::Ready, InputEvent::Select) => {
                self.menu.select_next();
                None
            }
            (Mode::Ready, InputEvent::Confirm) => self.start_run().err(),
            (Mode::Finished, _) => {
                self.transition(Event::Acknowledge);
                None
            }
            _ => None,
        }
    }

    /// Validate the selected test and start it
    fn start_run(&mut self) -> Result<(), StartRejection> {
        self.menu
            .selected()
            .validate(&self.config.actuator)
            .map_err(StartRejection::InvalidConfig)?;
        if !self.safety.is_clear() {
            return Err(StartRejection::SafetyNotClear);
        }
        self.transition(Event::Start);
        Ok(())
    }

    /// Perform a mode transition and apply its side effect
    fn transition(&mut self, event: Event) {
        let transition = self.mode.transition(event);
        self.mode = transition.next;

        match transition.effect {
            Effect::Arm | Effect::Rearm => self.arm_pending = true,
            Effect::BeginRun => {
                self.active = *self.menu.selected();
                self.sequencer.reset();
            }
            Effect::SafeStop | Effect::Idle => self.sequencer.reset(),
            Effect::None => {}
        }
    }

    fn actuator_command(&mut self, proposed_us: u16) -> ActuatorCommand {
        let arm = core::mem::take(&mut self.arm_pending);
        match self.mode {
            Mode::Boot | Mode::Abort(_) => ActuatorCommand::SafeStop,
            _ if arm => ActuatorCommand::Arm,
            Mode::Running => {
                ActuatorCommand::Pulse(self.config.actuator.clamp(i32::from(proposed_us)))
            }
            Mode::Ready | Mode::Finished => ActuatorCommand::Pulse(self.config.actuator.arm_us),
        }
    }

    fn command_width(&self, command: ActuatorCommand) -> u16 {
        match command {
            ActuatorCommand::Arm => self.config.actuator.arm_us,
            ActuatorCommand::Pulse(us) => us,
            ActuatorCommand::SafeStop => self.config.actuator.safe_stop_us,
        }
    }

    fn publish_due(&self, now_ms: u32) -> bool {
        self.last_publish_ms.map_or(true, |last| {
            now_ms.wrapping_sub(last) >= self.config.telemetry.publish_interval_ms
        })
    }
}
