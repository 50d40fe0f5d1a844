//! Sensor front-end
//!
//! Implements the core's [`SensorSource`] by running each channel on its
//! own interval. Each poll performs at most one acquisition, so a tick's
//! ingestion phase drains the channels that are due one at a time. A
//! channel is attempted at most once per tick time.

use thrustbench_core::config::LoadCellConfig;
use thrustbench_core::store::Channel;
use thrustbench_core::traits::{SensorEvent, SensorSample, SensorSource};

use super::{
    AnalogInput, AnalogReader, LinearChannel, LoadCell, LoadCellOutput, RawLoadCell, Thermistor,
};

/// Calibration and scheduling for the front-end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontEndConfig {
    pub voltage: LinearChannel,
    pub current: LinearChannel,
    pub thermistor: Thermistor,
    pub load_cell: LoadCellConfig,
    pub power_interval_ms: u32,
    /// 0 polls the amplifier every tick and takes whatever it has ready
    pub thrust_interval_ms: u32,
    pub temperature_interval_ms: u32,
}

impl Default for FrontEndConfig {
    fn default() -> Self {
        Self {
            voltage: LinearChannel::divider(11.0),
            current: LinearChannel::hall_current(40.0),
            thermistor: Thermistor::default(),
            load_cell: LoadCellConfig::default(),
            power_interval_ms: 20,
            thrust_interval_ms: 0,
            temperature_interval_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Schedule {
    interval_ms: u32,
    last_ms: Option<u32>,
}

impl Schedule {
    fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Claim the channel for `now_ms` if it is due
    fn take(&mut self, now_ms: u32) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => last != now_ms && now_ms.wrapping_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }
}

pub struct AnalogFrontEnd<A, L> {
    adc: A,
    amplifier: L,
    config: FrontEndConfig,
    load_cell: LoadCell,
    power: Schedule,
    thrust: Schedule,
    temperature: Schedule,
}

impl<A: AnalogReader, L: RawLoadCell> AnalogFrontEnd<A, L> {
    /// Create a new front-end; the load cell tares on its first readings
    pub fn new(adc: A, amplifier: L, config: FrontEndConfig) -> Self {
        Self {
            adc,
            amplifier,
            config,
            load_cell: LoadCell::new(config.load_cell),
            power: Schedule::new(config.power_interval_ms),
            thrust: Schedule::new(config.thrust_interval_ms),
            temperature: Schedule::new(config.temperature_interval_ms),
        }
    }

    pub fn load_cell(&self) -> &LoadCell {
        &self.load_cell
    }

    fn read_power(&mut self) -> SensorEvent {
        let reading = self
            .adc
            .read(AnalogInput::PackVoltage)
            .and_then(|counts| self.config.voltage.convert(counts))
            .and_then(|voltage_v| {
                self.adc
                    .read(AnalogInput::Current)
                    .and_then(|counts| self.config.current.convert(counts))
                    .map(|current_a| SensorSample::Power {
                        voltage_v,
                        current_a,
                    })
            });
        match reading {
            Ok(sample) => SensorEvent::Sample(sample),
            Err(e) => SensorEvent::Failed(Channel::Power, e),
        }
    }

    /// `None` while the amplifier has nothing ready or the tare is running
    fn read_thrust(&mut self) -> Option<SensorEvent> {
        let raw = match self.amplifier.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => return Some(SensorEvent::Failed(Channel::Thrust, e)),
        };
        match self.load_cell.feed(raw) {
            LoadCellOutput::Taring => None,
            LoadCellOutput::Tared => Some(SensorEvent::TareComplete),
            LoadCellOutput::Reading { raw, grams } => {
                Some(SensorEvent::Sample(SensorSample::Thrust { raw, grams }))
            }
        }
    }

    fn read_temperature(&mut self) -> SensorEvent {
        let reading = self
            .adc
            .read(AnalogInput::Temperature)
            .and_then(|counts| self.config.thermistor.convert(counts));
        match reading {
            Ok(celsius) => SensorEvent::Sample(SensorSample::Temperature { celsius }),
            Err(e) => SensorEvent::Failed(Channel::Temperature, e),
        }
    }
}

impl<A: AnalogReader, L: RawLoadCell> SensorSource for AnalogFrontEnd<A, L> {
    fn poll(&mut self, now_ms: u32) -> Option<SensorEvent> {
        if self.power.take(now_ms) {
            return Some(self.read_power());
        }
        if self.thrust.take(now_ms) {
            if let Some(event) = self.read_thrust() {
                return Some(event);
            }
        }
        if self.temperature.take(now_ms) {
            return Some(self.read_temperature());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::vec::Vec;
    use thrustbench_core::traits::SensorError;

    struct FixedAdc {
        voltage: Result<u16, SensorError>,
        current: Result<u16, SensorError>,
        temperature: Result<u16, SensorError>,
        reads: usize,
    }

    impl FixedAdc {
        fn nominal() -> Self {
            Self {
                voltage: Ok(2048),
                current: Ok(2048),
                temperature: Ok(3912),
                reads: 0,
            }
        }
    }

    impl AnalogReader for FixedAdc {
        fn read(&mut self, input: AnalogInput) -> Result<u16, SensorError> {
            self.reads += 1;
            match input {
                AnalogInput::PackVoltage => self.voltage,
                AnalogInput::Current => self.current,
                AnalogInput::Temperature => self.temperature,
            }
        }
    }

    /// Amplifier with a scripted sequence of conversions
    struct ScriptedAmp(VecDeque<Result<Option<i32>, SensorError>>);

    impl RawLoadCell for ScriptedAmp {
        fn read_raw(&mut self) -> Result<Option<i32>, SensorError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    fn config(tare_samples: u8) -> FrontEndConfig {
        FrontEndConfig {
            load_cell: LoadCellConfig {
                counts_per_gram: 200.0,
                filter_alpha: 1.0,
                tare_samples,
            },
            ..FrontEndConfig::default()
        }
    }

    fn drain<S: SensorSource>(source: &mut S, now_ms: u32) -> Vec<SensorEvent> {
        let mut events = Vec::new();
        while let Some(event) = source.poll(now_ms) {
            events.push(event);
            assert!(events.len() < 16, "source never went quiet");
        }
        events
    }

    #[test]
    fn test_first_poll_reads_every_channel() {
        let amp = ScriptedAmp(VecDeque::from([Ok(Some(1000)), Ok(Some(21_000))]));
        let mut fe = AnalogFrontEnd::new(FixedAdc::nominal(), amp, config(1));

        let events = drain(&mut fe, 0);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            SensorEvent::Sample(SensorSample::Power { current_a, .. }) if current_a == 0.0
        ));
        assert_eq!(events[1], SensorEvent::TareComplete);
        let SensorEvent::Sample(SensorSample::Temperature { celsius }) = events[2] else {
            panic!("expected a temperature sample");
        };
        assert!((celsius - 25.0).abs() < 0.5);

        let events = drain(&mut fe, 20);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            SensorEvent::Sample(SensorSample::Thrust {
                raw: 21_000,
                grams: 100.0
            })
        );
    }

    #[test]
    fn test_channel_intervals() {
        let amp = ScriptedAmp(VecDeque::new());
        let mut fe = AnalogFrontEnd::new(FixedAdc::nominal(), amp, config(1));
        drain(&mut fe, 0);

        // Power every 20 ms, temperature every 200 ms
        assert_eq!(drain(&mut fe, 10).len(), 0);
        assert_eq!(drain(&mut fe, 20).len(), 1);
        assert_eq!(drain(&mut fe, 180).len(), 1);
        assert_eq!(drain(&mut fe, 200).len(), 2);
    }

    #[test]
    fn test_tare_reported_once() {
        let amp = ScriptedAmp((0..6).map(|_| Ok(Some(500))).collect());
        let mut fe = AnalogFrontEnd::new(FixedAdc::nominal(), amp, config(3));

        let mut tares = 0;
        let mut thrust = 0;
        for tick in 0..6 {
            for event in drain(&mut fe, tick * 20) {
                match event {
                    SensorEvent::TareComplete => tares += 1,
                    SensorEvent::Sample(SensorSample::Thrust { grams, .. }) => {
                        assert_eq!(grams, 0.0);
                        thrust += 1;
                    }
                    _ => {}
                }
            }
        }
        assert_eq!(tares, 1);
        assert_eq!(thrust, 3);
        assert_eq!(fe.load_cell().offset(), Some(500));
    }

    #[test]
    fn test_failures_reported_per_channel() {
        let adc = FixedAdc {
            current: Err(SensorError::ConversionError),
            temperature: Ok(4095),
            ..FixedAdc::nominal()
        };
        let amp = ScriptedAmp(VecDeque::from([Err(SensorError::ConversionError)]));
        let mut fe = AnalogFrontEnd::new(adc, amp, config(1));

        let events = drain(&mut fe, 0);
        assert_eq!(
            events,
            [
                SensorEvent::Failed(Channel::Power, SensorError::ConversionError),
                SensorEvent::Failed(Channel::Thrust, SensorError::ConversionError),
                SensorEvent::Failed(Channel::Temperature, SensorError::OpenCircuit),
            ]
        );
    }

    #[test]
    fn test_voltage_failure_skips_current_read() {
        let adc = FixedAdc {
            voltage: Err(SensorError::ConversionError),
            ..FixedAdc::nominal()
        };
        let mut fe = AnalogFrontEnd::new(adc, ScriptedAmp(VecDeque::new()), config(1));
        assert_eq!(
            fe.poll(0),
            Some(SensorEvent::Failed(Channel::Power, SensorError::ConversionError))
        );
        assert_eq!(fe.adc.reads, 1);
    }
}
