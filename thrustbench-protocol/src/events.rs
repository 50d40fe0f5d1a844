//! Operator input edges
//!
//! The stand has two physical buttons (select, confirm). The host link can
//! send the same edges plus an explicit fault reset, which has no button so
//! a faulted run can never be resumed by a stray press.

/// One debounced input edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Advance the test selection
    Select,
    /// Confirm / start
    Confirm,
    /// Clear a latched fault and leave Abort
    Reset,
}

// Wire format values
const EVENT_SELECT: u8 = 0x01;
const EVENT_CONFIRM: u8 = 0x02;
const EVENT_RESET: u8 = 0x7F;

impl InputEvent {
    /// Parse an event from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            EVENT_SELECT => Some(InputEvent::Select),
            EVENT_CONFIRM => Some(InputEvent::Confirm),
            EVENT_RESET => Some(InputEvent::Reset),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            InputEvent::Select => EVENT_SELECT,
            InputEvent::Confirm => EVENT_CONFIRM,
            InputEvent::Reset => EVENT_RESET,
        }
    }

    /// Returns true if a physical button can produce this edge
    pub fn is_button(&self) -> bool {
        matches!(self, InputEvent::Select | InputEvent::Confirm)
    }
}
