use avr_device::atmega128a::ADC;
use core::convert::Infallible;
use embedded_hal::adc::{Channel, OneShot};

// ADCSRA
const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;
const ADIE: u8 = 1 << 3;

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum AdcReference {
    Aref = 0,            // External AREF
    Avcc = 1,            // AVCC with external cap at AREF
    Internal2_56V = 3,   // Internal 2.56V with external cap at AREF
}

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum AdcPrescaler {
    Div2 = 1,
    Div4 = 2,
    Div8 = 3,
    Div16 = 4,
    Div32 = 5,
    Div64 = 6,
    Div128 = 7,
}

/// Single-ended input ADC0 (PF0), the altitude potentiometer.
pub struct Adc0;

impl Channel<Adc> for Adc0 {
    type ID = u8;

    fn channel() -> u8 {
        0
    }
}

pub struct Adc {
    converting: bool,
}

impl Adc {
    pub const fn new() -> Self {
        Self { converting: false }
    }

    /// Enables the converter. The completion interrupt only acknowledges;
    /// results are collected by polling.
    pub fn configure(reference: AdcReference, prescaler: AdcPrescaler) {
        unsafe {
            let p = ADC::ptr();
            (*p).admux.write(|w| w.bits((reference as u8) << 6));
            (*p).adcsra.write(|w| w.bits(ADEN | ADIE | prescaler as u8));
        }
    }
}

impl<PIN> OneShot<Adc, u16, PIN> for Adc
where
    PIN: Channel<Adc, ID = u8>,
{
    type Error = Infallible;

    fn read(&mut self, _pin: &mut PIN) -> nb::Result<u16, Infallible> {
        unsafe {
            let p = ADC::ptr();

            if !self.converting {
                // Select channel, then start conversion
                (*p).admux.modify(|r, w| w.bits((r.bits() & 0xE0) | (PIN::channel() & 0x1F)));
                (*p).adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
                self.converting = true;
                return Err(nb::Error::WouldBlock);
            }

            if (*p).adcsra.read().bits() & ADSC != 0 {
                return Err(nb::Error::WouldBlock);
            }

            self.converting = false;
            Ok((*p).adc.read().bits())
        }
    }
}
