//! Linear analog channels
//!
//! Voltage dividers and hall-effect current sensors both map ADC counts
//! onto engineering units with an offset and a slope.

use thrustbench_core::traits::SensorError;

/// Counts-to-units calibration for one analog input
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinearChannel {
    /// Counts read at zero input
    pub offset_counts: f32,
    /// Engineering units per count
    pub units_per_count: f32,
    /// Counts at or above this are treated as a saturated or open input
    pub max_counts: u16,
}

impl LinearChannel {
    /// Pack voltage through a resistor divider into a 12-bit 3.3 V ADC
    ///
    /// `ratio` is (R_top + R_bottom) / R_bottom.
    pub fn divider(ratio: f32) -> Self {
        Self {
            offset_counts: 0.0,
            units_per_count: 3.3 / 4096.0 * ratio,
            max_counts: 4090,
        }
    }

    /// Bidirectional hall current sensor centred at half supply
    ///
    /// `mv_per_amp` is the sensor sensitivity at the ADC pin.
    pub fn hall_current(mv_per_amp: f32) -> Self {
        Self {
            offset_counts: 2048.0,
            units_per_count: 3300.0 / 4096.0 / mv_per_amp,
            max_counts: 4090,
        }
    }

    /// Convert raw counts
    pub fn convert(&self, counts: u16) -> Result<f32, SensorError> {
        if counts >= self.max_counts {
            return Err(SensorError::OutOfRange);
        }
        Ok((f32::from(counts) - self.offset_counts) * self.units_per_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider() {
        // 11:1 divider, full scale ~36 V
        let channel = LinearChannel::divider(11.0);
        assert_eq!(channel.convert(0).unwrap(), 0.0);
        let v = channel.convert(2048).unwrap();
        assert!((v - 18.15).abs() < 0.01);
    }

    #[test]
    fn test_hall_current_is_bidirectional() {
        // 40 mV/A
        let channel = LinearChannel::hall_current(40.0);
        assert_eq!(channel.convert(2048).unwrap(), 0.0);
        assert!(channel.convert(2548).unwrap() > 9.5);
        assert!(channel.convert(1548).unwrap() < -9.5);
    }

    #[test]
    fn test_saturated_input() {
        let channel = LinearChannel::divider(11.0);
        assert_eq!(channel.convert(4095), Err(SensorError::OutOfRange));
    }
}
