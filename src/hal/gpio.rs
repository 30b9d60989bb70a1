use avr_device::atmega128a::{PORTA, PORTE};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub struct Input;
pub struct Output;

/// One line of an I/O port, selected at runtime so lines of the same port
/// share a type.
pub struct Pin<PORT, MODE> {
    mask: u8,
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

macro_rules! impl_port {
    ($PORT:ident, $port:ident, $ddr:ident, $pin:ident) => {
        impl Pin<$PORT, Input> {
            /// Input without pull-up.
            pub fn input(bit: u8) -> Self {
                let mask = 1 << bit;
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !mask));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !mask));
                }
                Pin {
                    mask,
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl Pin<$PORT, Output> {
            /// Output, driven low.
            pub fn output(bit: u8) -> Self {
                let mask = 1 << bit;
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !mask));
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | mask));
                }
                Pin {
                    mask,
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl InputPin for Pin<$PORT, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Infallible> {
                let levels = unsafe { (*$PORT::ptr()).$pin.read().bits() };
                Ok(levels & self.mask != 0)
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Infallible> {
                self.is_high().map(|high| !high)
            }
        }

        impl OutputPin for Pin<$PORT, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Infallible> {
                let mask = self.mask;
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | mask));
                }
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Infallible> {
                let mask = self.mask;
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !mask));
                }
                Ok(())
            }
        }
    };
}

impl_port!(PORTA, porta, ddra, pina);
impl_port!(PORTE, porte, ddre, pine);

// Simulator rig pin assignments
pub mod board {
    use super::*;

    /// Manual buttons on PE4..PE7, the INT4..INT7 lines
    pub type Button = Pin<PORTE, Input>;
    /// Output lines on PA0..PA3
    pub type Led = Pin<PORTA, Output>;

    pub const BUTTON_BITS: [u8; 4] = [4, 5, 6, 7];
    pub const LED_BITS: [u8; 4] = [0, 1, 2, 3];

    pub fn buttons() -> [Button; 4] {
        BUTTON_BITS.map(Button::input)
    }

    pub fn leds() -> [Led; 4] {
        LED_BITS.map(Led::output)
    }
}
