//! Test sequencer
//!
//! Walks a run through ramp-up, stabilize and measure for every operating
//! point the algorithm produces, with an optional cooldown between points.
//! Only called while the mode is Running; the mode machine resets it on
//! run start and abort.

use super::step::{SequenceStep, StepEffect, StepTrigger};
use super::window::{WindowAccumulator, WindowRecord};
use crate::algorithm::{Algorithm, TestAlgorithm};
use crate::config::{ActuatorLimits, SeekTuning, SequenceTiming, TestConfig};
use crate::store::Snapshot;

/// Result of one sequencer tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    /// Width proposed for this tick
    pub command_us: u16,
    /// Window finalized on this tick
    pub record: Option<WindowRecord>,
    /// The last operating point has been measured
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    limits: ActuatorLimits,
    timing: SequenceTiming,
    tuning: SeekTuning,
    step: SequenceStep,
    algorithm: Option<Algorithm>,
    /// Tick time the current step was entered
    entered_ms: u32,
    /// Latest width proposed by the algorithm while ramping
    ramp_us: u16,
    /// Width frozen for stabilize and measure
    held_us: u16,
    window: WindowAccumulator,
}

impl Sequencer {
    /// Create an idle sequencer
    pub fn new(limits: ActuatorLimits, timing: SequenceTiming, tuning: SeekTuning) -> Self {
        Self {
            limits,
            timing,
            tuning,
            step: SequenceStep::Idle,
            algorithm: None,
            entered_ms: 0,
            ramp_us: limits.arm_us,
            held_us: limits.arm_us,
            window: WindowAccumulator::default(),
        }
    }

    /// Current step
    pub fn step(&self) -> SequenceStep {
        self.step
    }

    /// Samples in the open measurement window
    pub fn samples(&self) -> u16 {
        self.window.samples()
    }

    /// Index of the current operating point
    pub fn point(&self) -> u16 {
        self.algorithm.as_ref().map_or(0, |a| a.point())
    }

    /// Return to Idle, discarding the algorithm and any partial window
    pub fn reset(&mut self) {
        self.fire(StepTrigger::Reset, 0, &TestConfig::default());
    }

    fn fire(&mut self, trigger: StepTrigger, now_ms: u32, config: &TestConfig) -> StepEffect {
        let (next, effect) = self.step.on(trigger);
        if next != self.step {
            self.entered_ms = now_ms;
        }
        self.step = next;

        match effect {
            StepEffect::LoadAlgorithm => {
                self.algorithm = Algorithm::for_config(config, self.limits, self.tuning);
                self.ramp_us = self.limits.arm_us;
                self.held_us = self.limits.arm_us;
                self.window.clear();
            }
            StepEffect::StartSettle => self.held_us = self.ramp_us,
            StepEffect::OpenWindow => self.window.clear(),
            StepEffect::ResumeRamp => self.ramp_us = self.limits.arm_us,
            StepEffect::Discard => {
                self.algorithm = None;
                self.ramp_us = self.limits.arm_us;
                self.held_us = self.limits.arm_us;
                self.window.clear();
            }
            StepEffect::None | StepEffect::CloseWindow | StepEffect::CloseWindowAndFinish => {}
        }
        effect
    }

    fn ramp(&mut self, snapshot: &Snapshot, config: &TestConfig, now_ms: u32) {
        let elapsed = now_ms.wrapping_sub(self.entered_ms);
        let Some(algorithm) = self.algorithm.as_mut() else {
            return;
        };
        let out = algorithm.step(snapshot, config, elapsed);
        self.ramp_us = out.command_us;
        if out.target_reached {
            self.fire(StepTrigger::TargetReached, now_ms, config);
        }
    }

    /// Run one tick of the sequence
    ///
    /// `warn_temp` is the safety monitor's advisory for this tick.
    pub fn advance(
        &mut self,
        snapshot: &Snapshot,
        config: &TestConfig,
        now_ms: u32,
        warn_temp: bool,
    ) -> Advance {
        let mut record = None;
        let mut complete = false;
        let elapsed = now_ms.wrapping_sub(self.entered_ms);

        match self.step {
            SequenceStep::Idle => {
                self.fire(StepTrigger::Start, now_ms, config);
                if self.algorithm.is_some() {
                    self.ramp(snapshot, config, now_ms);
                } else {
                    self.fire(StepTrigger::Reset, now_ms, config);
                    complete = true;
                }
            }
            SequenceStep::RampUp => self.ramp(snapshot, config, now_ms),
            SequenceStep::Stabilize => {
                if elapsed >= self.timing.settle_ms {
                    self.fire(StepTrigger::SettleElapsed, now_ms, config);
                }
            }
            SequenceStep::Measure => {
                self.window.add(snapshot);
                if elapsed >= self.timing.window_ms {
                    let point = self.point();
                    let more_points = self
                        .algorithm
                        .as_mut()
                        .is_some_and(|a| a.next_point(config));
                    let trigger = StepTrigger::WindowElapsed {
                        more_points,
                        warn_temp,
                    };
                    let effect = self.fire(trigger, now_ms, config);
                    if matches!(
                        effect,
                        StepEffect::CloseWindow | StepEffect::CloseWindowAndFinish
                    ) {
                        record = self.window.finish(point, self.held_us, now_ms);
                        self.window.clear();
                        complete = effect == StepEffect::CloseWindowAndFinish;
                    }
                }
            }
            SequenceStep::Cooldown => {
                if !warn_temp {
                    self.fire(StepTrigger::Cooled, now_ms, config);
                    self.ramp(snapshot, config, now_ms);
                }
            }
        }

        let command_us = match self.step {
            SequenceStep::Cooldown => self.limits.arm_us,
            SequenceStep::Idle | SequenceStep::RampUp => self.ramp_us,
            SequenceStep::Stabilize | SequenceStep::Measure => self.held_us,
        };

        Advance {
            command_us,
            record,
            complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: u32 = 20;

    fn timing() -> SequenceTiming {
        SequenceTiming {
            tick_ms: TICK,
            settle_ms: 100,
            window_ms: 200,
        }
    }

    fn sequencer() -> Sequencer {
        Sequencer::new(ActuatorLimits::default(), timing(), SeekTuning::default())
    }

    fn steady() -> Snapshot {
        Snapshot {
            voltage_v: 24.0,
            current_a: 5.0,
            power_w: 120.0,
            thrust_g: 250.0,
            temperature_c: 40.0,
            ..Snapshot::new()
        }
    }

    /// Run until the sequencer reports completion or `max_ticks` elapse
    fn run(
        seq: &mut Sequencer,
        config: &TestConfig,
        max_ticks: u32,
        mut warn: impl FnMut(u32) -> bool,
    ) -> (heapless::Vec<WindowRecord, 16>, bool) {
        let mut records = heapless::Vec::new();
        for i in 0..max_ticks {
            let now = i * TICK;
            let out = seq.advance(&steady(), config, now, warn(now));
            assert!(ActuatorLimits::default().contains(out.command_us));
            if let Some(record) = out.record {
                records.push(record).unwrap();
            }
            if out.complete {
                return (records, true);
            }
        }
        (records, false)
    }

    #[test]
    fn test_ramp_map_emits_one_record_per_point() {
        let config = TestConfig::ramp_map(1100, 1300, 100);
        let mut seq = sequencer();
        let (records, complete) = run(&mut seq, &config, 1000, |_| false);

        assert!(complete);
        assert_eq!(records.len(), 3);
        let widths: heapless::Vec<u16, 3> = records.iter().map(|r| r.command_us).collect();
        assert_eq!(widths.as_slice(), &[1100, 1200, 1300]);
        let points: heapless::Vec<u16, 3> = records.iter().map(|r| r.point).collect();
        assert_eq!(points.as_slice(), &[0, 1, 2]);
        assert_eq!(seq.step(), SequenceStep::Idle);
    }

    #[test]
    fn test_window_average_equals_constant_input() {
        let config = TestConfig::ramp_map(1200, 1200, 50);
        let mut seq = sequencer();
        let (records, _) = run(&mut seq, &config, 1000, |_| false);

        let record = records[0];
        assert_eq!(record.thrust_g, 250.0);
        assert_eq!(record.power_w, 120.0);
        assert_eq!(record.temperature_c, 40.0);
        // Window of 200 ms at 20 ms ticks: entry tick excluded, deadline tick included
        assert_eq!(record.samples, 10);
    }

    #[test]
    fn test_phase_order() {
        let config = TestConfig::ramp_map(1100, 1100, 50);
        let mut seq = sequencer();

        seq.advance(&steady(), &config, 0, false);
        assert_eq!(seq.step(), SequenceStep::Stabilize);

        seq.advance(&steady(), &config, 80, false);
        assert_eq!(seq.step(), SequenceStep::Stabilize);

        seq.advance(&steady(), &config, 100, false);
        assert_eq!(seq.step(), SequenceStep::Measure);
        assert_eq!(seq.samples(), 0);

        seq.advance(&steady(), &config, 120, false);
        assert_eq!(seq.samples(), 1);
    }

    #[test]
    fn test_cooldown_between_points() {
        let config = TestConfig::ramp_map(1100, 1200, 100);
        let mut seq = sequencer();

        // Hot until 600 ms, first window closes at 300 ms
        let (records, complete) = run(&mut seq, &config, 1000, |now| now < 600);
        assert!(complete);
        assert_eq!(records.len(), 2);
        // Cooled at 600, settle 100, window 200
        assert_eq!(records[1].timestamp_ms, 900);
        assert_eq!(records[1].command_us, 1200);
    }

    #[test]
    fn test_cooldown_holds_arm_width() {
        let config = TestConfig::ramp_map(1500, 1600, 100);
        let mut seq = sequencer();
        let mut now = 0;
        loop {
            let out = seq.advance(&steady(), &config, now, true);
            if seq.step() == SequenceStep::Cooldown {
                assert_eq!(out.command_us, 1000);
                break;
            }
            now += TICK;
            assert!(now < 10_000);
        }
    }

    #[test]
    fn test_settle_freezes_ramp_width() {
        let config = TestConfig::ramp_map(1100, 1300, 100);
        let mut seq = sequencer();
        seq.advance(&steady(), &config, 0, false);
        assert_eq!(seq.step(), SequenceStep::Stabilize);
        assert_eq!(seq.held_us, 1100);

        // Later ramp proposals do not move a point already settling
        seq.ramp_us = 1450;
        let out = seq.advance(&steady(), &config, TICK, false);
        assert_eq!(out.command_us, 1100);
    }

    #[test]
    fn test_start_settle_takes_latest_ramp_width() {
        let mut seq = sequencer();
        seq.step = SequenceStep::RampUp;
        seq.ramp_us = 1234;
        let effect = seq.fire(StepTrigger::TargetReached, 40, &TestConfig::default());
        assert_eq!(effect, StepEffect::StartSettle);
        assert_eq!(seq.step(), SequenceStep::Stabilize);
        assert_eq!(seq.held_us, 1234);
    }

    #[test]
    fn test_resume_ramp_restarts_from_arm_width() {
        let mut seq = sequencer();
        seq.step = SequenceStep::Cooldown;
        seq.ramp_us = 1600;
        let effect = seq.fire(StepTrigger::Cooled, 40, &TestConfig::default());
        assert_eq!(effect, StepEffect::ResumeRamp);
        assert_eq!(seq.step(), SequenceStep::RampUp);
        assert_eq!(seq.ramp_us, 1000);
    }

    #[test]
    fn test_reset_discards_partial_window() {
        let config = TestConfig::ramp_map(1100, 1300, 100);
        let mut seq = sequencer();
        for i in 0..10 {
            seq.advance(&steady(), &config, i * TICK, false);
        }
        assert_eq!(seq.step(), SequenceStep::Measure);
        assert!(seq.samples() > 0);

        seq.reset();
        assert_eq!(seq.step(), SequenceStep::Idle);
        assert_eq!(seq.samples(), 0);
        assert_eq!(seq.point(), 0);
    }

    #[test]
    fn test_no_test_selected_completes_immediately() {
        let mut seq = sequencer();
        let out = seq.advance(&steady(), &TestConfig::default(), 0, false);
        assert!(out.complete);
        assert!(out.record.is_none());
        assert_eq!(out.command_us, 1000);
    }
}
