//! Debounced push button

use embedded_hal::digital::InputPin;

/// Consecutive identical samples needed to accept a level change
pub const DEFAULT_DEBOUNCE_SAMPLES: u8 = 3;

/// Push button sampled once per control tick
///
/// Reports one edge per press, on the debounced transition to pressed.
pub struct Button<P> {
    pin: P,
    /// Pin reads low when pressed (pull-up wiring)
    active_low: bool,
    debounce: u8,
    pressed: bool,
    /// Consecutive samples disagreeing with `pressed`
    run: u8,
}

impl<P: InputPin> Button<P> {
    /// Create a new button on a pulled-up, switch-to-ground pin
    pub fn new(pin: P) -> Self {
        Self::with_config(pin, true, DEFAULT_DEBOUNCE_SAMPLES)
    }

    pub fn with_config(pin: P, active_low: bool, debounce: u8) -> Self {
        Self {
            pin,
            active_low,
            debounce: debounce.max(1),
            pressed: false,
            run: 0,
        }
    }

    /// Debounced level
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Sample the pin; true on the sample that accepts a press
    ///
    /// A failed pin read counts as "no change".
    pub fn update(&mut self) -> bool {
        let Ok(high) = self.pin.is_high() else {
            return false;
        };
        let raw = high != self.active_low;

        if raw == self.pressed {
            self.run = 0;
            return false;
        }

        self.run = self.run.saturating_add(1);
        if self.run < self.debounce {
            return false;
        }

        self.run = 0;
        self.pressed = raw;
        raw
    }
}
