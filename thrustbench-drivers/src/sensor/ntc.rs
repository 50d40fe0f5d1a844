//! NTC 100k thermistor on the motor can
//!
//! Circuit: 3V3 -- pull-up -- ADC pin -- NTC -- GND. Resistance is mapped to
//! temperature through a B=3950 lookup table with linear interpolation.

use thrustbench_core::traits::SensorError;

/// (resistance in ohms, temperature in 0.1 °C), decreasing resistance
const TABLE: &[(u32, i16)] = &[
    (332_100, 0),
    (199_000, 100),
    (123_000, 200),
    (100_000, 250),
    (79_900, 300),
    (53_000, 400),
    (36_000, 500),
    (24_900, 600),
    (17_600, 700),
    (12_600, 800),
    (9_200, 900),
    (6_800, 1000),
    (5_100, 1100),
    (3_900, 1200),
    (3_000, 1300),
    (2_300, 1400),
    (1_800, 1500),
];

/// Counts within this distance of either rail are treated as wiring faults
const RAIL_MARGIN: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thermistor {
    /// Pull-up resistor (ohms)
    pub pullup_ohms: u32,
    /// ADC full scale (4096 for 12-bit)
    pub adc_max: u16,
}

impl Default for Thermistor {
    fn default() -> Self {
        Self {
            pullup_ohms: 4_700,
            adc_max: 4_096,
        }
    }
}

impl Thermistor {
    /// Thermistor resistance for a reading
    pub fn resistance(&self, counts: u16) -> Result<u32, SensorError> {
        if counts >= self.adc_max.saturating_sub(RAIL_MARGIN) {
            return Err(SensorError::OpenCircuit);
        }
        if counts < RAIL_MARGIN {
            return Err(SensorError::ShortCircuit);
        }
        let ohms = u64::from(self.pullup_ohms) * u64::from(counts)
            / u64::from(self.adc_max - counts);
        Ok(ohms as u32)
    }

    /// Temperature in 0.1 °C for a thermistor resistance
    pub fn deci_celsius(ohms: u32) -> Result<i16, SensorError> {
        TABLE
            .windows(2)
            .find(|pair| ohms <= pair[0].0 && ohms >= pair[1].0)
            .map(|pair| {
                let (r_hi, t_lo) = pair[0];
                let (r_lo, t_hi) = pair[1];
                let span = i64::from(r_hi - r_lo);
                let offset = i64::from(r_hi - ohms);
                let rise = i64::from(t_hi - t_lo);
                t_lo + (rise * offset / span) as i16
            })
            .ok_or(SensorError::OutOfRange)
    }

    /// Convert raw counts to °C
    pub fn convert(&self, counts: u16) -> Result<f32, SensorError> {
        let deci = Self::deci_celsius(self.resistance(counts)?)?;
        Ok(f32::from(deci) / 10.0)
    }
}
