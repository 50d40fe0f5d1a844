//! Shared state store
//!
//! The single owned record of stand state. All writes happen inside one
//! open tick; readers see the record as of the last finalized tick.

pub mod snapshot;

pub use snapshot::{Channel, Freshness, Snapshot};

use crate::sequence::SequenceStep;
use crate::traits::SensorSample;

/// Tick discipline violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// `begin_tick` while a tick is already open
    NestedTick,
    /// Write attempted with no tick open
    TickClosed,
}

/// Rejected sensor sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IngestError {
    /// Reading was NaN or infinite; previous value held
    NonFinite(Channel),
    /// No tick open
    Store(StoreError),
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        IngestError::Store(err)
    }
}

/// Owner of the stand snapshot
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Record being written by the open tick
    working: Snapshot,
    /// Record as of the last finalized tick
    published: Snapshot,
    freshness: Freshness,
    open_tick: Option<u32>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create an empty store
    pub const fn new() -> Self {
        Self {
            working: Snapshot::new(),
            published: Snapshot::new(),
            freshness: Freshness::new(),
            open_tick: None,
        }
    }

    /// Open the writer phase for the tick at `now_ms`
    pub fn begin_tick(&mut self, now_ms: u32) -> Result<(), StoreError> {
        if self.open_tick.is_some() {
            return Err(StoreError::NestedTick);
        }
        self.open_tick = Some(now_ms);
        self.working.timestamp_ms = now_ms;
        Ok(())
    }

    /// Close the writer phase and publish the working record
    pub fn finalize_tick(&mut self) -> Result<&Snapshot, StoreError> {
        if self.open_tick.take().is_none() {
            return Err(StoreError::TickClosed);
        }
        self.published = self.working;
        Ok(&self.published)
    }

    /// Whether a tick is currently open
    pub fn tick_open(&self) -> bool {
        self.open_tick.is_some()
    }

    fn now(&self) -> Result<u32, StoreError> {
        self.open_tick.ok_or(StoreError::TickClosed)
    }

    /// Overwrite the fields carried by `sample` and stamp its channel
    pub fn ingest(&mut self, sample: SensorSample) -> Result<(), IngestError> {
        let now = self.now()?;
        let channel = sample.channel();

        match sample {
            SensorSample::Power {
                voltage_v,
                current_a,
            } => {
                if !voltage_v.is_finite() || !current_a.is_finite() {
                    return Err(IngestError::NonFinite(channel));
                }
                self.working.voltage_v = voltage_v;
                self.working.current_a = current_a;
                self.working.power_w = voltage_v * current_a;
            }
            SensorSample::Thrust { raw, grams } => {
                if !grams.is_finite() {
                    return Err(IngestError::NonFinite(channel));
                }
                self.working.thrust_raw = raw;
                self.working.thrust_g = grams;
            }
            SensorSample::Temperature { celsius } => {
                if !celsius.is_finite() {
                    return Err(IngestError::NonFinite(channel));
                }
                self.working.temperature_c = celsius;
            }
        }

        self.freshness.touch(channel, now);
        Ok(())
    }

    /// Record the width proposed for this tick
    pub fn set_command(&mut self, command_us: u16) -> Result<(), StoreError> {
        self.now()?;
        self.working.command_us = command_us;
        Ok(())
    }

    /// Record what the actuator actually holds after this tick's write
    pub fn set_actuator(&mut self, actual_us: u16, armed: bool) -> Result<(), StoreError> {
        self.now()?;
        self.working.actual_us = actual_us;
        self.working.armed = armed;
        Ok(())
    }

    /// Record sequencer progress
    pub fn set_sequence(
        &mut self,
        step: SequenceStep,
        sample_count: u16,
    ) -> Result<(), StoreError> {
        self.now()?;
        self.working.step = step;
        self.working.sample_count = sample_count;
        Ok(())
    }

    /// Record as seen by the pipeline inside the open tick
    pub fn working(&self) -> &Snapshot {
        &self.working
    }

    /// Record as of the last finalized tick
    pub fn snapshot(&self) -> &Snapshot {
        &self.published
    }

    /// Per-channel update times
    pub fn freshness(&self) -> &Freshness {
        &self.freshness
    }

    /// Milliseconds since `channel` was last accepted
    pub fn age_ms(&self, channel: Channel, now_ms: u32) -> Option<u32> {
        self.freshness.age_ms(channel, now_ms)
    }
}
