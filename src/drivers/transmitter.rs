//! Interrupt-paced transmitter: one byte per transmit-ready event

use crate::protocol::{MessageBuffer, Report};
use embedded_hal::serial;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Nothing in flight; the event was spurious.
    Idle,
    /// This byte was handed to the data register.
    Sent(u8),
    /// Message complete and shift register drained; disarm the source.
    Drained,
}

pub struct Transmitter<S> {
    serial: S,
    message: MessageBuffer,
    cursor: usize,
    in_flight: bool,
}

impl<S: serial::Write<u8>> Transmitter<S> {
    pub fn new(serial: S) -> Self {
        Self {
            serial,
            message: MessageBuffer::new(),
            cursor: 0,
            in_flight: false,
        }
    }

    /// Loads `report` as the message in flight.
    ///
    /// Returns true when this replaced a message that had not finished; its
    /// remaining bytes are never sent. The caller arms the transmit-ready
    /// source.
    pub fn send(&mut self, report: Report) -> bool {
        let replaced = self.in_flight;
        if report.encode(&mut self.message).is_err() {
            self.message.clear();
        }
        self.cursor = 0;
        self.in_flight = true;
        replaced
    }

    /// Services one transmit-ready event.
    ///
    /// At the end of the message this blocks until the last byte has left
    /// the shift register.
    pub fn on_ready(&mut self) -> TxStatus {
        if !self.in_flight {
            return TxStatus::Idle;
        }

        match self.message.get(self.cursor) {
            Some(byte) => {
                // Data register is empty when this event fires, a write error drops the byte
                nb::block!(self.serial.write(byte)).ok();
                self.cursor += 1;
                TxStatus::Sent(byte)
            }
            None => {
                nb::block!(self.serial.flush()).ok();
                self.cursor = 0;
                self.in_flight = false;
                TxStatus::Drained
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Bytes of the current message not yet handed to the hardware.
    pub fn remaining(&self) -> &[u8] {
        if self.in_flight {
            &self.message.as_bytes()[self.cursor..]
        } else {
            &[]
        }
    }

    pub fn release(self) -> S {
        self.serial
    }
}
