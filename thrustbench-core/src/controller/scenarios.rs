//! End-to-end runs of the control pipeline against scripted collaborators

use std::collections::VecDeque;
use std::vec::Vec;

use proptest::prelude::*;
use thrustbench_protocol::InputEvent;

use super::*;
use crate::config::{ActuatorLimits, ConfigError, SequenceTiming, TestConfig};
use crate::sequence::SequenceStep;
use crate::state::FaultKind;
use crate::traits::SensorSample;

const TICK: u32 = 20;

/// Bench plant: nominal electrics, thrust tracking the last ESC width
struct ScriptedSensors {
    voltage_v: f32,
    current_a: f32,
    temperature_c: f32,
    send_temperature: bool,
    tare_pending: bool,
    queue: VecDeque<SensorEvent>,
}

impl ScriptedSensors {
    fn new() -> Self {
        Self {
            voltage_v: 24.0,
            current_a: 5.0,
            temperature_c: 30.0,
            send_temperature: true,
            tare_pending: true,
            queue: VecDeque::new(),
        }
    }

    fn fill(&mut self, pulse_us: u16) {
        let grams = f32::from(pulse_us) - 1000.0;
        self.queue.push_back(SensorEvent::Sample(SensorSample::Power {
            voltage_v: self.voltage_v,
            current_a: self.current_a,
        }));
        self.queue.push_back(SensorEvent::Sample(SensorSample::Thrust {
            raw: (grams * 200.0) as i32,
            grams,
        }));
        if self.send_temperature {
            self.queue
                .push_back(SensorEvent::Sample(SensorSample::Temperature {
                    celsius: self.temperature_c,
                }));
        }
        if core::mem::take(&mut self.tare_pending) {
            self.queue.push_back(SensorEvent::TareComplete);
        }
    }
}

impl SensorSource for ScriptedSensors {
    fn poll(&mut self, _now_ms: u32) -> Option<SensorEvent> {
        self.queue.pop_front()
    }
}

#[derive(Default)]
struct RecordingEsc {
    pulse_us: u16,
    writes: Vec<u16>,
    arms: usize,
    stops: usize,
}

impl EscDriver for RecordingEsc {
    fn arm(&mut self) {
        self.arms += 1;
        self.pulse_us = 1000;
        self.writes.push(1000);
    }

    fn set_pulse_us(&mut self, pulse_us: u16) {
        self.pulse_us = pulse_us;
        self.writes.push(pulse_us);
    }

    fn emergency_stop(&mut self) {
        self.stops += 1;
        self.pulse_us = 1000;
        self.writes.push(1000);
    }

    fn pulse_us(&self) -> u16 {
        self.pulse_us
    }
}

#[derive(Default)]
struct RecordingSink {
    live: Vec<LiveFrame>,
    records: Vec<WindowRecord>,
    modes: Vec<Mode>,
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, frame: &LiveFrame) {
        self.live.push(*frame);
    }

    fn record(&mut self, record: &WindowRecord) {
        self.records.push(*record);
    }

    fn mode_changed(&mut self, _now_ms: u32, mode: Mode) {
        self.modes.push(mode);
    }
}

struct Rig {
    controller: Controller,
    sensors: ScriptedSensors,
    esc: RecordingEsc,
    sink: RecordingSink,
    now: u32,
    last_ms: u32,
}

impl Rig {
    fn new() -> Self {
        let mut config = StandConfig::default();
        config.timing = SequenceTiming {
            tick_ms: TICK,
            settle_ms: 100,
            window_ms: 200,
        };
        Self {
            controller: Controller::new(config).unwrap(),
            sensors: ScriptedSensors::new(),
            esc: RecordingEsc::default(),
            sink: RecordingSink::default(),
            now: 0,
            last_ms: 0,
        }
    }

    /// Rig already through Boot
    fn ready() -> Self {
        let mut rig = Self::new();
        let out = rig.tick(None);
        assert_eq!(out.mode, Mode::Ready);
        rig
    }

    fn with_presets(presets: &[TestConfig]) -> Self {
        let mut rig = Self::ready();
        rig.controller.menu_mut().replace(presets).unwrap();
        rig
    }

    fn tick(&mut self, input: Option<InputEvent>) -> TickOutcome {
        self.sensors.fill(self.esc.pulse_us);
        let out = self
            .controller
            .tick(
                self.now,
                &mut self.sensors,
                input,
                &mut self.esc,
                &mut self.sink,
            )
            .unwrap();
        self.last_ms = self.now;
        self.now += TICK;
        out
    }

    fn tick_until(
        &mut self,
        max_ticks: usize,
        done: impl Fn(&Self, &TickOutcome) -> bool,
    ) -> TickOutcome {
        for _ in 0..max_ticks {
            let out = self.tick(None);
            if done(self, &out) {
                return out;
            }
        }
        panic!("condition not reached within {max_ticks} ticks");
    }

    fn step(&self) -> SequenceStep {
        self.controller.snapshot().step
    }
}

#[test]
fn test_ramp_map_run() {
    let mut rig = Rig::with_presets(&[TestConfig::ramp_map(1100, 1300, 100)]);

    let out = rig.tick(Some(InputEvent::Confirm));
    assert_eq!(out.mode, Mode::Running);
    assert_eq!(out.rejection, None);
    assert_eq!(out.command, ActuatorCommand::Pulse(1100));

    rig.tick_until(500, |_, out| out.mode == Mode::Finished);

    let widths: Vec<u16> = rig.sink.records.iter().map(|r| r.command_us).collect();
    assert_eq!(widths, [1100, 1200, 1300]);
    let points: Vec<u16> = rig.sink.records.iter().map(|r| r.point).collect();
    assert_eq!(points, [0, 1, 2]);
    assert!(rig
        .sink
        .records
        .windows(2)
        .all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    // Window means of a thrust that tracks the width
    assert_eq!(rig.sink.records[2].thrust_g, 300.0);

    assert_eq!(rig.sink.modes, [Mode::Ready, Mode::Running, Mode::Finished]);
    assert_eq!(rig.controller.snapshot().command_us, 1000);
    assert_eq!(rig.step(), SequenceStep::Idle);
}

#[test]
fn test_constant_thrust_run() {
    let mut rig = Rig::ready();
    rig.tick(Some(InputEvent::Select));
    assert_eq!(rig.controller.menu().selected().target_thrust_g, 500.0);
    rig.tick(Some(InputEvent::Confirm));

    let mut commands = Vec::new();
    for _ in 0..500 {
        let out = rig.tick(None);
        if out.mode != Mode::Running {
            assert_eq!(out.mode, Mode::Finished);
            break;
        }
        if let ActuatorCommand::Pulse(us) = out.command {
            commands.push(us);
        }
    }

    assert_eq!(rig.controller.mode(), Mode::Finished);
    assert!(commands.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(rig.sink.records.len(), 1);
    let record = rig.sink.records[0];
    assert!((record.thrust_g - 500.0).abs() <= 10.0);
    assert_eq!(record.point, 0);
}

#[test]
fn test_over_current_aborts_on_third_tick() {
    let mut rig = Rig::with_presets(&[TestConfig::ramp_map(1100, 1900, 100)]);
    rig.tick(Some(InputEvent::Confirm));
    for _ in 0..3 {
        rig.tick(None);
    }

    rig.sensors.current_a = 45.0;
    assert_eq!(rig.tick(None).mode, Mode::Running);
    assert_eq!(rig.tick(None).mode, Mode::Running);
    assert_eq!(rig.esc.stops, 0);

    let out = rig.tick(None);
    assert_eq!(out.mode, Mode::Abort(FaultKind::OverCurrent));
    assert_eq!(out.safety, SafetyStatus::Fault(FaultKind::OverCurrent));
    assert_eq!(out.command, ActuatorCommand::SafeStop);
    assert_eq!(rig.esc.stops, 1);
    assert_eq!(rig.esc.pulse_us, 1000);
    assert!(!rig.controller.snapshot().armed);
}

#[test]
fn test_abort_is_idempotent() {
    let mut rig = Rig::with_presets(&[TestConfig::ramp_map(1100, 1900, 100)]);
    rig.tick(Some(InputEvent::Confirm));
    rig.sensors.current_a = 45.0;
    rig.tick_until(10, |_, out| out.mode.is_abort());

    // A second, different condition does not replace the first
    rig.sensors.temperature_c = 95.0;
    for _ in 0..10 {
        let out = rig.tick(Some(InputEvent::Confirm));
        assert_eq!(out.mode, Mode::Abort(FaultKind::OverCurrent));
        assert_eq!(out.command, ActuatorCommand::SafeStop);
        assert_eq!(out.record, None);
    }
    assert_eq!(
        rig.sink.modes,
        [Mode::Ready, Mode::Running, Mode::Abort(FaultKind::OverCurrent)]
    );
}

#[test]
fn test_invalid_config_rejected_at_start() {
    let mut rig = Rig::with_presets(&[TestConfig::ramp_map(1100, 1300, 0)]);
    let out = rig.tick(Some(InputEvent::Confirm));
    assert_eq!(
        out.rejection,
        Some(StartRejection::InvalidConfig(ConfigError::EmptyRampStep))
    );
    assert_eq!(out.mode, Mode::Ready);
    assert_eq!(out.command, ActuatorCommand::Pulse(1000));
}

#[test]
fn test_start_refused_while_fault_debouncing() {
    let mut rig = Rig::ready();
    rig.sensors.current_a = 45.0;
    let out = rig.tick(Some(InputEvent::Confirm));
    assert_eq!(out.rejection, Some(StartRejection::SafetyNotClear));
    assert_eq!(out.mode, Mode::Ready);
}

#[test]
fn test_fault_during_measure_discards_window() {
    let mut rig = Rig::with_presets(&[TestConfig::ramp_map(1100, 1300, 100)]);
    rig.tick(Some(InputEvent::Confirm));
    rig.tick_until(50, |rig, _| rig.step() == SequenceStep::Measure);
    rig.tick(None);
    assert!(rig.controller.snapshot().sample_count > 0);

    rig.sensors.current_a = 45.0;
    rig.tick_until(5, |_, out| out.mode.is_abort());

    assert!(rig.sink.records.is_empty());
    assert_eq!(rig.step(), SequenceStep::Idle);
    assert_eq!(rig.controller.snapshot().sample_count, 0);
}

#[test]
fn test_boot_waits_for_tare() {
    let mut rig = Rig::new();
    rig.sensors.tare_pending = false;

    for _ in 0..5 {
        let out = rig.tick(Some(InputEvent::Confirm));
        assert_eq!(out.mode, Mode::Boot);
        assert_eq!(out.command, ActuatorCommand::SafeStop);
    }
    assert_eq!(rig.esc.arms, 0);

    rig.sensors.tare_pending = true;
    let out = rig.tick(None);
    assert_eq!(out.mode, Mode::Ready);
    assert_eq!(out.command, ActuatorCommand::Arm);
    assert_eq!(rig.esc.arms, 1);
    assert!(rig.controller.snapshot().armed);
}

#[test]
fn test_confirm_on_tare_tick_is_not_consumed() {
    let mut rig = Rig::new();
    rig.sensors.voltage_v = 15.0;

    let out = rig.tick(Some(InputEvent::Confirm));
    assert_eq!(out.previous, Mode::Boot);
    assert_eq!(out.mode, Mode::Ready);
    assert_eq!(out.rejection, None);
    assert_eq!(out.command, ActuatorCommand::Arm);

    // The first evaluated tick sees the low pack and refuses the start
    let out = rig.tick(Some(InputEvent::Confirm));
    assert_eq!(out.rejection, Some(StartRejection::SafetyNotClear));
    assert_eq!(out.mode, Mode::Ready);
}

#[test]
fn test_stale_temperature_aborts() {
    let mut rig = Rig::ready();
    rig.sensors.send_temperature = false;

    let out = rig.tick_until(200, |_, out| out.mode.is_abort());
    assert_eq!(out.mode, Mode::Abort(FaultKind::SensorStale));
    // Last sample at 0 ms, stale after 2000 ms, then three ticks of debounce
    assert_eq!(rig.last_ms, 2060);
}

#[test]
fn test_reset_leaves_abort() {
    let mut rig = Rig::ready();
    rig.sensors.current_a = 45.0;
    rig.tick_until(5, |_, out| out.mode.is_abort());

    rig.sensors.current_a = 5.0;
    let out = rig.tick(Some(InputEvent::Select));
    assert!(out.mode.is_abort());

    rig.controller.reset();
    let out = rig.tick(None);
    assert_eq!(out.mode, Mode::Ready);
    assert_eq!(out.command, ActuatorCommand::Arm);
    assert_eq!(rig.esc.arms, 2);
    assert!(rig.controller.safety().is_clear());

    // Abort again, then leave through the input edge
    rig.sensors.current_a = 45.0;
    rig.tick_until(5, |_, out| out.mode.is_abort());
    rig.sensors.current_a = 5.0;
    assert_eq!(rig.tick(Some(InputEvent::Reset)).mode, Mode::Ready);
}

#[test]
fn test_finished_acknowledged_by_any_input() {
    let mut rig = Rig::with_presets(&[
        TestConfig::ramp_map(1100, 1100, 50),
        TestConfig::ramp_map(1200, 1200, 50),
    ]);
    rig.tick(Some(InputEvent::Confirm));
    rig.tick_until(100, |_, out| out.mode == Mode::Finished);

    let out = rig.tick(None);
    assert_eq!(out.mode, Mode::Finished);
    assert_eq!(out.command, ActuatorCommand::Pulse(1000));

    let out = rig.tick(Some(InputEvent::Select));
    assert_eq!(out.mode, Mode::Ready);
    assert_eq!(rig.controller.menu().selected_index(), 0);
    assert_eq!(rig.controller.active_test().pwm_start_us, 1100);
}

#[test]
fn test_cooldown_holds_arm_width_while_warm() {
    let mut rig = Rig::with_presets(&[TestConfig::ramp_map(1500, 1600, 100)]);
    rig.sensors.temperature_c = 65.0;
    rig.tick(Some(InputEvent::Confirm));

    let out = rig.tick_until(100, |rig, _| rig.step() == SequenceStep::Cooldown);
    assert_eq!(out.mode, Mode::Running);
    assert_eq!(out.safety, SafetyStatus::WarnTemp);
    assert_eq!(out.command, ActuatorCommand::Pulse(1000));
    assert_eq!(rig.sink.records.len(), 1);

    rig.sensors.temperature_c = 40.0;
    let out = rig.tick(None);
    assert_eq!(out.command, ActuatorCommand::Pulse(1600));
    rig.tick_until(100, |_, out| out.mode == Mode::Finished);
    assert_eq!(rig.sink.records.len(), 2);
}

#[test]
fn test_publish_cadence() {
    let mut rig = Rig::new();
    for _ in 0..50 {
        rig.tick(None);
    }
    // 100 ms interval at 20 ms ticks
    assert_eq!(rig.sink.live.len(), 10);
    assert_eq!(rig.sink.live[1].snapshot.timestamp_ms, 100);
    assert_eq!(rig.sink.live[0].mode, Mode::Ready);
}

#[test]
fn test_readers_see_finalized_tick() {
    let mut rig = Rig::ready();
    rig.sensors.voltage_v = 23.5;
    rig.tick(None);
    let snapshot = rig.controller.snapshot();
    assert_eq!(snapshot.voltage_v, 23.5);
    assert_eq!(snapshot.timestamp_ms, rig.last_ms);
    assert!(!rig.controller.store().tick_open());
}

proptest! {
    #[test]
    fn actuator_writes_stay_in_limits(
        steps in prop::collection::vec(
            (0u8..8, 0.0f32..60.0, 20.0f32..100.0, 15.0f32..26.0),
            1..300,
        )
    ) {
        let mut rig = Rig::new();
        for (choice, current, temperature, voltage) in steps {
            rig.sensors.current_a = current;
            rig.sensors.temperature_c = temperature;
            rig.sensors.voltage_v = voltage;
            let input = match choice {
                0 => Some(InputEvent::Select),
                1 | 2 => Some(InputEvent::Confirm),
                3 => Some(InputEvent::Reset),
                _ => None,
            };
            let out = rig.tick(input);
            if out.mode.is_abort() {
                prop_assert_eq!(out.command, ActuatorCommand::SafeStop);
            }
        }

        let limits = ActuatorLimits::default();
        prop_assert!(rig.esc.writes.iter().all(|&us| limits.contains(us)));
    }
}
