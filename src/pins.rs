//! # Modem control lines

/// Discrete lines wired between host and modem
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pin {
    /// Reset/power key line, driven by the host
    Reset,

    /// Status line, driven high by the modem while it is powered
    Status,
}

/// Input bias
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

/// GPIO access required for powering the modem and reading its status line
///
/// Lets the user of this crate plug in the pin types of whatever HAL is in use.
pub trait ModemPins {
    /// Configures the line as push-pull output with the given initial level
    fn enable_output(&mut self, pin: Pin, high: bool);

    /// Configures the line as input with the given bias
    fn enable_input(&mut self, pin: Pin, pull: Pull);

    /// Returns true if the line is high
    fn read(&mut self, pin: Pin) -> bool;

    /// Drives the line high
    fn set(&mut self, pin: Pin);

    /// Drives the line low
    fn reset(&mut self, pin: Pin);

    /// Releases the line, leaving it floating
    fn deinit(&mut self, pin: Pin);
}
