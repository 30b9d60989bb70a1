//! Debug log for the simulator
//!
//! The log never shares the tester link. On the target it is either routed to
//! a second serial port or compiled down to [`NoLog`].

use crate::protocol::Hex;
use ufmt::{uWrite, uwrite};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogType {
    System = 0,
    Command = 1,
    Telemetry = 2,
    Error = 3,
}

impl LogType {
    pub fn tag(self) -> &'static str {
        match self {
            LogType::System => "SYS",
            LogType::Command => "CMD",
            LogType::Telemetry => "TLM",
            LogType::Error => "ERR",
        }
    }
}

/// Sink for one-line log records of a message and a numeric value.
pub trait Log {
    fn log(&mut self, log_type: LogType, message: &str, value: u16);

    fn log_system(&mut self, message: &str, value: u16) {
        self.log(LogType::System, message, value)
    }

    fn log_command(&mut self, message: &str, value: u16) {
        self.log(LogType::Command, message, value)
    }

    fn log_telemetry(&mut self, message: &str, value: u16) {
        self.log(LogType::Telemetry, message, value)
    }

    fn log_error(&mut self, message: &str, value: u16) {
        self.log(LogType::Error, message, value)
    }
}

/// Discards every record.
#[derive(Default)]
pub struct NoLog;

impl Log for NoLog {
    #[inline]
    fn log(&mut self, _log_type: LogType, _message: &str, _value: u16) {}
}

/// Writes `[TAG] message: 0xHHHH` lines to any `ufmt` writer.
pub struct Logger<W> {
    writer: W,
    written: u32,
}

impl<W: uWrite> Logger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Records successfully written so far.
    pub fn written(&self) -> u32 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: uWrite> Log for Logger<W> {
    fn log(&mut self, log_type: LogType, message: &str, value: u16) {
        let record = uwrite!(
            self.writer,
            "[{}] {}: 0x{}\r\n",
            log_type.tag(),
            message,
            Hex::<4>(value)
        );
        // A failing log sink is not worth disturbing the simulation for
        if record.is_ok() {
            self.written = self.written.wrapping_add(1);
        }
    }
}
