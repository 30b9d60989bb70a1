use embedded_hal::serial;
use ufmt::uWrite;

/// Blocking text output over a serial port, used for the debug log.
pub struct SerialConsole<S> {
    serial: S,
}

impl<S: serial::Write<u8>> SerialConsole<S> {
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), S::Error> {
        nb::block!(self.serial.write(byte))
    }

    pub fn release(self) -> S {
        self.serial
    }
}

impl<S: serial::Write<u8>> uWrite for SerialConsole<S> {
    type Error = S::Error;

    fn write_str(&mut self, s: &str) -> Result<(), S::Error> {
        for byte in s.bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{Log, Logger};
    use embedded_hal_mock::serial::{Mock as SerialMock, Transaction};

    #[test]
    fn log_lines_go_out_byte_by_byte() {
        let line = b"[SYS] boot: 0x0001\r\n";
        let expectations: Vec<Transaction<u8>> =
            line.iter().map(|&b| Transaction::write(b)).collect();

        let mut logger = Logger::new(SerialConsole::new(SerialMock::new(&expectations)));
        logger.log_system("boot", 1);

        logger.into_inner().release().done();
    }
}
