//! Hardware seams of the simulator
//!
//! The core only sees the traits below. The ATmega128 implementations sit in
//! the target-only submodules; host tests supply their own.

use crate::logger::Log;
use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::serial;

#[cfg(target_arch = "avr")]
pub mod adc;
#[cfg(target_arch = "avr")]
pub mod board;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod power;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;

#[cfg(target_arch = "avr")]
pub use board::{
    configure_analog_input, configure_digital_lines, configure_serial, configure_timer,
    Atmega128,
};
#[cfg(target_arch = "avr")]
pub use power::Power;

/// Switches for the interrupt sources the simulator arms and disarms.
pub trait InterruptControl {
    /// Clears a receive overrun by cycling the receiver.
    fn restart_receiver(&mut self);

    fn set_tick_enabled(&mut self, enabled: bool);

    fn set_transmit_ready_enabled(&mut self, enabled: bool);

    fn set_input_change_enabled(&mut self, enabled: bool);
}

/// Concrete peripheral types of one board.
pub trait Board {
    /// Tester link, written one byte per transmit-ready event
    type Serial: serial::Write<u8>;
    /// Converter the altitude channel belongs to
    type AdcKind;
    type Adc: OneShot<Self::AdcKind, u16, Self::AltitudeChannel>;
    type AltitudeChannel: Channel<Self::AdcKind>;
    /// Manual button input, high when pressed
    type Input: InputPin;
    type Output: OutputPin;
    type Control: InterruptControl;
    type Log: Log;
}
