//! ESC driver trait

/// Trait for the electronic speed controller signal output
///
/// The controller issues exactly one of these calls per tick and only
/// with widths inside the configured actuator limits.
pub trait EscDriver {
    /// Write the arm width so the ESC initialises
    fn arm(&mut self);

    /// Set the commanded pulse width in microseconds
    fn set_pulse_us(&mut self, us: u16);

    /// Immediately write the safe stop width
    fn emergency_stop(&mut self);

    /// Width currently being output
    fn pulse_us(&self) -> u16;
}
