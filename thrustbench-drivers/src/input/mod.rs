//! Front panel input
//!
//! Three buttons produce the operator's input edges. The panel is sampled
//! once per control tick and yields at most one edge.

pub mod button;

pub use button::Button;

use embedded_hal::digital::InputPin;
use thrustbench_protocol::InputEvent;

pub struct InputPanel<S, C, R> {
    select: Button<S>,
    confirm: Button<C>,
    reset: Button<R>,
    /// Edge that lost a same-tick tie, reported on the next quiet poll
    pending: Option<InputEvent>,
}

impl<S: InputPin, C: InputPin, R: InputPin> InputPanel<S, C, R> {
    pub fn new(select: Button<S>, confirm: Button<C>, reset: Button<R>) -> Self {
        Self {
            select,
            confirm,
            reset,
            pending: None,
        }
    }

    /// Sample all buttons, returning the edge of this tick
    ///
    /// Every button is sampled so debounce state stays current. If two
    /// presses are accepted on the same tick, reset wins over confirm and
    /// confirm over select. A select beaten by confirm is reported on the
    /// next poll without a new edge; a reset drops anything held back.
    pub fn poll(&mut self) -> Option<InputEvent> {
        let select = self.select.update();
        let confirm = self.confirm.update();
        let reset = self.reset.update();

        match (reset, confirm, select) {
            (true, _, _) => {
                self.pending = None;
                Some(InputEvent::Reset)
            }
            (false, true, true) => {
                self.pending = Some(InputEvent::Select);
                Some(InputEvent::Confirm)
            }
            (false, true, false) => Some(InputEvent::Confirm),
            (false, false, true) => Some(InputEvent::Select),
            (false, false, false) => self.pending.take(),
        }
    }
}
