//! Load cell tare, calibration and smoothing
//!
//! The first `tare_samples` raw readings after power-up are averaged into
//! the zero offset. After that every reading is converted to grams and run
//! through an exponential low-pass filter.

use thrustbench_core::config::LoadCellConfig;

/// Result of feeding one raw reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadCellOutput {
    /// Still collecting the zero offset
    Taring,
    /// The reading that completed the tare
    Tared,
    /// Filtered thrust
    Reading { raw: i32, grams: f32 },
}

#[derive(Debug, Clone)]
pub struct LoadCell {
    config: LoadCellConfig,
    tare_sum: i64,
    tare_count: u8,
    offset: Option<i32>,
    filtered: Option<f32>,
}

impl LoadCell {
    /// Create an untared load cell
    pub fn new(config: LoadCellConfig) -> Self {
        Self {
            config,
            tare_sum: 0,
            tare_count: 0,
            offset: None,
            filtered: None,
        }
    }

    /// Zero offset, once tared
    pub fn offset(&self) -> Option<i32> {
        self.offset
    }

    pub fn is_tared(&self) -> bool {
        self.offset.is_some()
    }

    /// Restart the tare and drop the filter state
    pub fn retare(&mut self) {
        self.tare_sum = 0;
        self.tare_count = 0;
        self.offset = None;
        self.filtered = None;
    }

    /// Feed one raw reading
    pub fn feed(&mut self, raw: i32) -> LoadCellOutput {
        let Some(offset) = self.offset else {
            self.tare_sum += i64::from(raw);
            self.tare_count = self.tare_count.saturating_add(1);
            if self.tare_count < self.config.tare_samples.max(1) {
                return LoadCellOutput::Taring;
            }
            self.offset = Some((self.tare_sum / i64::from(self.tare_count)) as i32);
            return LoadCellOutput::Tared;
        };

        let grams = raw.wrapping_sub(offset) as f32 / self.config.counts_per_gram;
        let alpha = self.config.filter_alpha;
        let filtered = match self.filtered {
            Some(previous) => previous + alpha * (grams - previous),
            None => grams,
        };
        self.filtered = Some(filtered);

        LoadCellOutput::Reading {
            raw,
            grams: filtered,
        }
    }
}
