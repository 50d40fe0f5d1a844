//! Measurement window accumulation

use crate::store::Snapshot;

/// Averages of one finalized measurement window
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowRecord {
    /// Zero-based operating point index
    pub point: u16,
    /// Width held during the window (µs)
    pub command_us: u16,
    pub voltage_v: f32,
    pub current_a: f32,
    pub power_w: f32,
    pub thrust_g: f32,
    pub temperature_c: f32,
    pub samples: u16,
    /// Tick time the window was finalized (ms)
    pub timestamp_ms: u32,
}

impl WindowRecord {
    /// Thrust per electrical watt, `None` without meaningful power draw
    pub fn efficiency_g_per_w(&self) -> Option<f32> {
        if self.power_w > 0.01 {
            Some(self.thrust_g / self.power_w)
        } else {
            None
        }
    }
}

/// Running sums for the open window
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAccumulator {
    voltage: f32,
    current: f32,
    power: f32,
    thrust: f32,
    temperature: f32,
    samples: u16,
}

impl WindowAccumulator {
    /// Add one tick's readings
    pub fn add(&mut self, snapshot: &Snapshot) {
        self.voltage += snapshot.voltage_v;
        self.current += snapshot.current_a;
        self.power += snapshot.power_w;
        self.thrust += snapshot.thrust_g;
        self.temperature += snapshot.temperature_c;
        self.samples = self.samples.saturating_add(1);
    }

    /// Samples accumulated so far
    pub fn samples(&self) -> u16 {
        self.samples
    }

    /// Drop all accumulated samples
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Average the window, `None` if nothing was accumulated
    pub fn finish(&self, point: u16, command_us: u16, timestamp_ms: u32) -> Option<WindowRecord> {
        if self.samples == 0 {
            return None;
        }
        let n = f32::from(self.samples);
        Some(WindowRecord {
            point,
            command_us,
            voltage_v: self.voltage / n,
            current_a: self.current / n,
            power_w: self.power / n,
            thrust_g: self.thrust / n,
            temperature_c: self.temperature / n,
            samples: self.samples,
            timestamp_ms,
        })
    }
}
