//! Command frame accumulation with start-marker resynchronization

use crate::config::{END_MARKER, FRAME_CAPACITY, START_MARKER};

/// Outcome of feeding one byte to the receiver.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameEvent<'a> {
    /// Byte stored (or a start marker seen); frame still open.
    Partial,
    /// Buffer full, byte dropped.
    Overflow,
    /// End marker seen; the frame as stored so far.
    Complete(&'a [u8]),
}

pub struct FrameReceiver {
    buffer: [u8; FRAME_CAPACITY],
    cursor: usize,
}

impl FrameReceiver {
    pub const fn new() -> Self {
        Self {
            buffer: [0; FRAME_CAPACITY],
            cursor: 0,
        }
    }

    pub fn push(&mut self, byte: u8) -> FrameEvent<'_> {
        // A new start marker always wins over a truncated frame
        if byte == START_MARKER {
            self.cursor = 0;
        }

        // Last slot is never filled
        let stored = if self.cursor < FRAME_CAPACITY - 1 {
            self.buffer[self.cursor] = byte;
            self.cursor += 1;
            true
        } else {
            false
        };

        if byte == END_MARKER {
            let len = self.cursor;
            self.cursor = 0;
            return FrameEvent::Complete(&self.buffer[..len]);
        }

        if stored {
            FrameEvent::Partial
        } else {
            FrameEvent::Overflow
        }
    }

    /// Bytes accumulated in the open frame.
    pub fn pending(&self) -> &[u8] {
        &self.buffer[..self.cursor]
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}
