//! HX711 24-bit load cell amplifier
//!
//! Two-wire serial: the converter pulls DOUT low when a conversion is
//! ready, then shifts 24 bits out MSB first on PD_SCK rising edges. One
//! extra clock selects channel A at gain 128 for the next conversion.
//! Holding PD_SCK high for more than 60 µs powers the chip down, so the
//! clock is always left low.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use thrustbench_core::traits::SensorError;

use super::RawLoadCell;

const DATA_BITS: u8 = 24;
/// Extra clocks after the data bits: 1 = channel A, gain 128
const GAIN_PULSES: u8 = 1;

pub struct Hx711<D, C, T> {
    data: D,
    clock: C,
    delay: T,
}

impl<D, C, T> Hx711<D, C, T>
where
    D: InputPin,
    C: OutputPin,
    T: DelayNs,
{
    /// Create a new HX711 driver
    pub fn new(data: D, clock: C, delay: T) -> Self {
        Self { data, clock, delay }
    }

    fn pulse(&mut self) -> Result<(), SensorError> {
        self.clock
            .set_high()
            .map_err(|_| SensorError::ConversionError)?;
        self.delay.delay_us(1);
        self.clock
            .set_low()
            .map_err(|_| SensorError::ConversionError)?;
        self.delay.delay_us(1);
        Ok(())
    }

    fn data_high(&mut self) -> Result<bool, SensorError> {
        self.data.is_high().map_err(|_| SensorError::ConversionError)
    }

    /// Shift out one conversion if one is ready
    pub fn try_read(&mut self) -> Result<Option<i32>, SensorError> {
        if self.data_high()? {
            return Ok(None);
        }

        let mut value: u32 = 0;
        for _ in 0..DATA_BITS {
            self.pulse()?;
            value = (value << 1) | u32::from(self.data_high()?);
        }
        for _ in 0..GAIN_PULSES {
            self.pulse()?;
        }

        // Sign-extend the 24-bit two's complement value
        Ok(Some(((value << 8) as i32) >> 8))
    }
}

impl<D, C, T> RawLoadCell for Hx711<D, C, T>
where
    D: InputPin,
    C: OutputPin,
    T: DelayNs,
{
    fn read_raw(&mut self) -> Result<Option<i32>, SensorError> {
        self.try_read()
    }
}
