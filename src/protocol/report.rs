//! Outbound telemetry frames and their fixed-size text buffer

use super::{ProtocolError, Result};
use crate::config::MESSAGE_CAPACITY;
use ufmt::{uDisplay, uWrite, uwrite, Formatter};

const HEX_CHARS: [u8; 16] = *b"0123456789ABCDEF";

/// Uppercase, zero-padded hex field of `N` digits (at most 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hex<const N: usize>(pub u16);

impl<const N: usize> uDisplay for Hex<N> {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let mut digits = [b'0'; 4];
        for (i, digit) in digits.iter_mut().enumerate() {
            let shift = (3 - i) * 4;
            *digit = HEX_CHARS[((self.0 >> shift) & 0xF) as usize];
        }
        let field = &digits[4 - N.min(4)..];
        f.write_str(core::str::from_utf8(field).unwrap_or("0000"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// `$DSTxxxx#`, remaining distance
    Distance(u16),
    /// `$ALTxxxx#`, altitude in feet
    Altitude(u16),
    /// `$PRSxx#`, code of the input that changed
    Press(u8),
    /// `$END#`, stop acknowledgement
    StopAck,
}

impl uDisplay for Report {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            Report::Distance(distance) => {
                f.write_str("$DST")?;
                Hex::<4>(distance).fmt(f)?;
            }
            Report::Altitude(feet) => {
                f.write_str("$ALT")?;
                Hex::<4>(feet).fmt(f)?;
            }
            Report::Press(code) => {
                f.write_str("$PRS")?;
                Hex::<2>(code as u16).fmt(f)?;
            }
            Report::StopAck => f.write_str("$END")?,
        }
        f.write_str("#")
    }
}

impl Report {
    /// Renders the report into `buffer`, replacing its contents.
    pub fn encode(&self, buffer: &mut MessageBuffer) -> Result<()> {
        buffer.clear();
        uwrite!(buffer, "{}", *self)
    }
}

/// Text of one outbound message.
pub struct MessageBuffer {
    data: [u8; MESSAGE_CAPACITY],
    len: usize,
}

impl MessageBuffer {
    pub const fn new() -> Self {
        Self {
            data: [0; MESSAGE_CAPACITY],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl uWrite for MessageBuffer {
    type Error = ProtocolError;

    fn write_str(&mut self, s: &str) -> Result<()> {
        let bytes = s.as_bytes();
        let end = self.len + bytes.len();
        if end > MESSAGE_CAPACITY {
            return Err(ProtocolError::BufferOverflow);
        }
        self.data[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}
