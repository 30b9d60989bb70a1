//! Tester link protocol: `$` + opcode + hex payload + `#`

pub mod frame;
pub mod report;

pub use frame::{FrameEvent, FrameReceiver};
pub use report::{Hex, MessageBuffer, Report};

use crate::config::{END_MARKER, START_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    BufferOverflow,
    InvalidFrame,
    UnknownOpcode,
}

pub type Result<T> = core::result::Result<T, ProtocolError>;

/// Width of the numeric fields on the wire, in hex digits.
pub const WORD_DIGITS: usize = 4;
pub const BYTE_DIGITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Goo,
    End,
    Spd,
    Alt,
    Man,
    Led,
}

impl Opcode {
    const TABLE: [(Opcode, &'static [u8; 3]); 6] = [
        (Opcode::Goo, b"GOO"),
        (Opcode::End, b"END"),
        (Opcode::Spd, b"SPD"),
        (Opcode::Alt, b"ALT"),
        (Opcode::Man, b"MAN"),
        (Opcode::Led, b"LED"),
    ];

    /// Classifies a frame by the three bytes following the start marker.
    /// A frame that ends before its opcode does is invalid.
    pub fn from_frame(frame: &[u8]) -> Result<Self> {
        match frame {
            [START_MARKER, a, b, c, ..] if ![a, b, c].contains(&&END_MARKER) => Self::TABLE
                .iter()
                .find(|(_, name)| **name == [*a, *b, *c])
                .map(|(opcode, _)| *opcode)
                .ok_or(ProtocolError::UnknownOpcode),
            _ => Err(ProtocolError::InvalidFrame),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Goo => "GOO",
            Opcode::End => "END",
            Opcode::Spd => "SPD",
            Opcode::Alt => "ALT",
            Opcode::Man => "MAN",
            Opcode::Led => "LED",
        }
    }
}

/// A decoded command frame.
///
/// A payload of `None` means the frame carried no leading hex digit where a
/// number was expected. Handlers keep their previous value in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start(Option<u16>),
    Stop,
    SetSpeed(Option<u16>),
    SetAltitudePeriod(Option<u16>),
    SetManual(Option<u8>),
    SetOutput(Option<u8>),
}

impl Command {
    pub fn parse(frame: &[u8]) -> Result<Self> {
        let opcode = Opcode::from_frame(frame)?;
        let payload = &frame[4..];
        let word = || parse_hex(payload, WORD_DIGITS);
        let byte = || parse_hex(payload, BYTE_DIGITS).map(|v| v as u8);

        Ok(match opcode {
            Opcode::Goo => Command::Start(word()),
            Opcode::End => Command::Stop,
            Opcode::Spd => Command::SetSpeed(word()),
            Opcode::Alt => Command::SetAltitudePeriod(word()),
            Opcode::Man => Command::SetManual(byte()),
            Opcode::Led => Command::SetOutput(byte()),
        })
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Start(_) => Opcode::Goo,
            Command::Stop => Opcode::End,
            Command::SetSpeed(_) => Opcode::Spd,
            Command::SetAltitudePeriod(_) => Opcode::Alt,
            Command::SetManual(_) => Opcode::Man,
            Command::SetOutput(_) => Opcode::Led,
        }
    }

    /// True when the opcode expects a number and none could be read.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Command::Start(None)
                | Command::SetSpeed(None)
                | Command::SetAltitudePeriod(None)
                | Command::SetManual(None)
                | Command::SetOutput(None)
        )
    }
}

/// Reads up to `width` leading hex digits, stopping at the first non-hex byte.
///
/// Returns `None` if not a single digit was read. Trailing bytes, including
/// the end marker, are ignored.
pub fn parse_hex(payload: &[u8], width: usize) -> Option<u16> {
    let mut value: u16 = 0;
    let mut digits = 0;

    for &byte in payload.iter().take(width) {
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => break,
        };
        value = (value << 4) | nibble as u16;
        digits += 1;
    }

    if digits > 0 {
        Some(value)
    } else {
        None
    }
}
