use super::adc::{Adc, Adc0, AdcPrescaler, AdcReference};
use super::gpio::board::{buttons, leds, Button, Led, BUTTON_BITS};
use super::timer::TickTimer;
use super::uart::Usart0;
use super::{Board, InterruptControl};
use crate::application::Parts;
use crate::config::UART_BAUD;
use avr_device::atmega128a::EXINT;

#[cfg(feature = "debug")]
use super::uart::Usart1;
#[cfg(feature = "debug")]
use crate::config::DEBUG_BAUD;
#[cfg(feature = "debug")]
use crate::drivers::SerialConsole;
#[cfg(feature = "debug")]
use crate::logger::Logger;
#[cfg(not(feature = "debug"))]
use crate::logger::NoLog;

// EICRB: ISCn1:ISCn0 = 01 selects any logical change on INT4..INT7
const ANY_EDGE_INT4_7: u8 = 0b0101_0101;

fn input_change_mask() -> u8 {
    BUTTON_BITS.iter().fold(0, |mask, bit| mask | (1 << bit))
}

/// The ATmega128 simulator rig.
pub struct Atmega128;

impl Board for Atmega128 {
    type Serial = Usart0;
    type AdcKind = Adc;
    type Adc = Adc;
    type AltitudeChannel = Adc0;
    type Input = Button;
    type Output = Led;
    type Control = Interrupts;
    #[cfg(feature = "debug")]
    type Log = Logger<SerialConsole<Usart1>>;
    #[cfg(not(feature = "debug"))]
    type Log = NoLog;
}

impl Atmega128 {
    /// Handles for the configured peripherals. Call once, after the
    /// `configure_*` functions.
    pub fn parts() -> Parts<Self> {
        Parts {
            serial: Usart0::new(),
            adc: Adc::new(),
            altitude_channel: Adc0,
            buttons: buttons(),
            leds: leds(),
            control: Interrupts { _private: () },
            #[cfg(feature = "debug")]
            log: Logger::new(SerialConsole::new(Usart1::new())),
            #[cfg(not(feature = "debug"))]
            log: NoLog,
        }
    }
}

/// Tester link on USART0, plus the debug log on USART1 when enabled.
pub fn configure_serial() {
    Usart0::configure(UART_BAUD, true);
    #[cfg(feature = "debug")]
    Usart1::configure(DEBUG_BAUD, false);
}

/// Telemetry tick on Timer1. The tick stays masked until a run starts.
pub fn configure_timer(period_ms: u16) {
    TickTimer::configure(period_ms);
    TickTimer::disable_interrupt();
}

/// ADC0 against AVCC, 125 kHz converter clock at 16 MHz.
pub fn configure_analog_input() {
    Adc::configure(AdcReference::Avcc, AdcPrescaler::Div128);
}

/// Buttons on INT4..INT7 (masked until manual mode) and the output lines.
pub fn configure_digital_lines() {
    let _ = buttons();
    let _ = leds();
    unsafe {
        let p = EXINT::ptr();
        (*p).eimsk.modify(|r, w| w.bits(r.bits() & !input_change_mask()));
        (*p).eicrb.write(|w| w.bits(ANY_EDGE_INT4_7));
    }
}

/// Interrupt enable bits of the sources the simulator drives.
pub struct Interrupts {
    _private: (),
}

impl InterruptControl for Interrupts {
    fn restart_receiver(&mut self) {
        Usart0::restart_receiver();
    }

    fn set_tick_enabled(&mut self, enabled: bool) {
        if enabled {
            TickTimer::enable_interrupt();
        } else {
            TickTimer::disable_interrupt();
        }
    }

    fn set_transmit_ready_enabled(&mut self, enabled: bool) {
        Usart0::set_udre_interrupt(enabled);
    }

    fn set_input_change_enabled(&mut self, enabled: bool) {
        let mask = input_change_mask();
        unsafe {
            let p = EXINT::ptr();
            if enabled {
                // Drop edges latched while masked
                (*p).eifr.write(|w| w.bits(mask));
                (*p).eimsk.modify(|r, w| w.bits(r.bits() | mask));
            } else {
                (*p).eimsk.modify(|r, w| w.bits(r.bits() & !mask));
            }
        }
    }
}
