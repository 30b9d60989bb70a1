use crate::config::CPU_FREQ_HZ;
use crate::os::{Event, Pending};
use avr_device::atmega128a::{USART0, USART1};
use core::convert::Infallible;
use embedded_hal::serial;

// UCSRnA
const RXC: u8 = 1 << 7;
const TXC: u8 = 1 << 6;
const UDRE: u8 = 1 << 5;
const DOR: u8 = 1 << 3;
const U2X: u8 = 1 << 1;

// UCSRnB
const RXCIE: u8 = 1 << 7;
const UDRIE: u8 = 1 << 5;
const RXEN: u8 = 1 << 4;
const TXEN: u8 = 1 << 3;

// UCSRnC: asynchronous, no parity, one stop bit, 8 data bits
const FRAME_8N1: u8 = 0x06;

/// Baud register value in double-speed mode, rounded to nearest.
pub const fn ubrr_for(baud: u32) -> u16 {
    ((CPU_FREQ_HZ + 4 * baud) / (8 * baud) - 1) as u16
}

macro_rules! impl_usart {
    ($Name:ident, $USART:ident, $udr:ident, $ucsra:ident, $ucsrb:ident, $ucsrc:ident, $ubrrh:ident, $ubrrl:ident) => {
        /// Handle to the port. Registers are owned by whoever configured it.
        pub struct $Name {
            unflushed: bool,
        }

        impl $Name {
            pub const fn new() -> Self {
                Self { unflushed: false }
            }

            /// 8N1, double speed, receiver and transmitter on.
            pub fn configure(baud: u32, rx_interrupt: bool) {
                let ubrr = ubrr_for(baud);
                let rx_ie = if rx_interrupt { RXCIE } else { 0 };
                unsafe {
                    let p = $USART::ptr();
                    (*p).$ubrrh.write(|w| w.bits((ubrr >> 8) as u8));
                    (*p).$ubrrl.write(|w| w.bits(ubrr as u8));
                    (*p).$ucsra.write(|w| w.bits(U2X));
                    (*p).$ucsrc.write(|w| w.bits(FRAME_8N1));
                    (*p).$ucsrb.write(|w| w.bits(RXEN | TXEN | rx_ie));
                }
            }

            /// Status flags and, if one arrived, the received byte.
            pub fn poll_receive() -> (bool, Option<u8>) {
                unsafe {
                    let p = $USART::ptr();
                    let status = (*p).$ucsra.read().bits();
                    // DOR stays readable until UDR is read
                    let overrun = status & DOR != 0;
                    let byte = if status & RXC != 0 {
                        Some((*p).$udr.read().bits())
                    } else {
                        None
                    };
                    (overrun, byte)
                }
            }

            pub fn restart_receiver() {
                unsafe {
                    let p = $USART::ptr();
                    (*p).$ucsrb.modify(|r, w| w.bits(r.bits() & !RXEN));
                    (*p).$ucsrb.modify(|r, w| w.bits(r.bits() | RXEN));
                }
            }

            pub fn set_udre_interrupt(enabled: bool) {
                unsafe {
                    let p = $USART::ptr();
                    if enabled {
                        (*p).$ucsrb.modify(|r, w| w.bits(r.bits() | UDRIE));
                    } else {
                        (*p).$ucsrb.modify(|r, w| w.bits(r.bits() & !UDRIE));
                    }
                }
            }
        }

        impl serial::Write<u8> for $Name {
            type Error = Infallible;

            fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
                unsafe {
                    let p = $USART::ptr();
                    if (*p).$ucsra.read().bits() & UDRE == 0 {
                        return Err(nb::Error::WouldBlock);
                    }
                    // TXC is cleared by writing one; keep double speed set
                    (*p).$ucsra.write(|w| w.bits(TXC | U2X));
                    (*p).$udr.write(|w| w.bits(word));
                }
                self.unflushed = true;
                Ok(())
            }

            /// Waits for the shift register to empty after the last write.
            fn flush(&mut self) -> nb::Result<(), Infallible> {
                if !self.unflushed {
                    return Ok(());
                }
                let done = unsafe { (*$USART::ptr()).$ucsra.read().bits() & TXC != 0 };
                if done {
                    self.unflushed = false;
                    Ok(())
                } else {
                    Err(nb::Error::WouldBlock)
                }
            }
        }
    };
}

// Tester link
impl_usart!(Usart0, USART0, udr0, ucsr0a, ucsr0b, ucsr0c, ubrr0h, ubrr0l);
// Debug log
impl_usart!(Usart1, USART1, udr1, ucsr1a, ucsr1b, ucsr1c, ubrr1h, ubrr1l);

/// Latches the receive-side conditions of the tester link.
pub fn receive_pending() -> Pending {
    let (overrun, byte) = Usart0::poll_receive();
    let mut pending = Pending::none();
    if overrun {
        pending = pending.with(Event::ReceiverOverrun);
    }
    if let Some(byte) = byte {
        pending = pending.with(Event::ByteReceived(byte));
    }
    pending
}
