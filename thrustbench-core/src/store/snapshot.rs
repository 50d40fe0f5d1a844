//! Snapshot of stand state

use crate::sequence::SequenceStep;

/// Latest known value of every sensor and control field
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    /// Tick time the snapshot was last written (ms)
    pub timestamp_ms: u32,
    /// Pack voltage (V)
    pub voltage_v: f32,
    /// Pack current (A)
    pub current_a: f32,
    /// Electrical power (W), derived as voltage × current
    pub power_w: f32,
    /// Unfiltered load cell counts
    pub thrust_raw: i32,
    /// Tared, filtered thrust (g)
    pub thrust_g: f32,
    /// Motor/ESC temperature (°C)
    pub temperature_c: f32,
    /// Width proposed for this tick (µs)
    pub command_us: u16,
    /// Width actually applied to the ESC (µs)
    pub actual_us: u16,
    pub armed: bool,
    pub step: SequenceStep,
    /// Samples accumulated in the open measurement window
    pub sample_count: u16,
}

impl Snapshot {
    /// Snapshot at power-on, before any sample
    pub const fn new() -> Self {
        Self {
            timestamp_ms: 0,
            voltage_v: 0.0,
            current_a: 0.0,
            power_w: 0.0,
            thrust_raw: 0,
            thrust_g: 0.0,
            temperature_c: 0.0,
            command_us: 0,
            actual_us: 0,
            armed: false,
            step: SequenceStep::Idle,
            sample_count: 0,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Independently sampled sensor channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Voltage and current, sampled together
    Power,
    Thrust,
    Temperature,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Power, Channel::Thrust, Channel::Temperature];

    pub(crate) const fn index(self) -> usize {
        match self {
            Channel::Power => 0,
            Channel::Thrust => 1,
            Channel::Temperature => 2,
        }
    }
}

/// Time of the last accepted sample per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Freshness {
    updated_ms: [Option<u32>; 3],
}

impl Freshness {
    /// No channel sampled yet
    pub const fn new() -> Self {
        Self {
            updated_ms: [None; 3],
        }
    }

    /// Stamp a channel as updated at `now_ms`
    pub fn touch(&mut self, channel: Channel, now_ms: u32) {
        self.updated_ms[channel.index()] = Some(now_ms);
    }

    /// Milliseconds since the channel was last updated, `None` if never
    pub fn age_ms(&self, channel: Channel, now_ms: u32) -> Option<u32> {
        self.updated_ms[channel.index()].map(|t| now_ms.wrapping_sub(t))
    }

    /// First channel older than `timeout_ms` or never sampled
    pub fn stale(&self, now_ms: u32, timeout_ms: u32) -> Option<Channel> {
        Channel::ALL.into_iter().find(|&channel| {
            self.age_ms(channel, now_ms)
                .map_or(true, |age| age > timeout_ms)
        })
    }
}
