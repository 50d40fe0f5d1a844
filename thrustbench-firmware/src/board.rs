//! Board wiring
//!
//! Pin assignments for the stand's RP2040 carrier board:
//!
//! | Function            | Pin    |
//! |---------------------|--------|
//! | Link UART TX / RX   | GPIO0 / GPIO1 |
//! | HX711 DOUT / PD_SCK | GPIO2 / GPIO3 |
//! | Select / Confirm / Reset buttons | GPIO10 / GPIO11 / GPIO12 |
//! | ESC signal (PWM0 A) | GPIO16 |
//! | Pack voltage divider | GPIO26 (ADC0) |
//! | Hall current sensor | GPIO27 (ADC1) |
//! | Motor NTC           | GPIO28 (ADC2) |

use embassy_rp::adc::{Adc, Blocking, Channel};
use thrustbench_core::traits::SensorError;
use thrustbench_drivers::sensor::{AnalogInput, AnalogReader};

/// On-chip ADC with the stand's three analog inputs
pub struct BoardAdc {
    adc: Adc<'static, Blocking>,
    voltage: Channel<'static>,
    current: Channel<'static>,
    temperature: Channel<'static>,
}

impl BoardAdc {
    pub fn new(
        adc: Adc<'static, Blocking>,
        voltage: Channel<'static>,
        current: Channel<'static>,
        temperature: Channel<'static>,
    ) -> Self {
        Self {
            adc,
            voltage,
            current,
            temperature,
        }
    }
}

impl AnalogReader for BoardAdc {
    fn read(&mut self, input: AnalogInput) -> Result<u16, SensorError> {
        let channel = match input {
            AnalogInput::PackVoltage => &mut self.voltage,
            AnalogInput::Current => &mut self.current,
            AnalogInput::Temperature => &mut self.temperature,
        };
        self.adc
            .blocking_read(channel)
            .map_err(|_| SensorError::ConversionError)
    }
}
