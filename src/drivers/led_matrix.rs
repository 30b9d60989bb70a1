use crate::config::LINE_COUNT;
use embedded_hal::digital::v2::OutputPin;

/// The four output lines driven by the tester in manual mode.
///
/// Keeps a shadow of the levels it last wrote, bit `n` for line `n`.
pub struct LedMatrix<O> {
    leds: [O; LINE_COUNT],
    pattern: u8,
}

impl<O: OutputPin> LedMatrix<O> {
    pub fn new(leds: [O; LINE_COUNT]) -> Self {
        Self { leds, pattern: 0 }
    }

    /// Drives one line high and leaves the others as they are.
    pub fn set(&mut self, line: usize) {
        if let Some(led) = self.leds.get_mut(line) {
            led.set_high().ok();
            self.pattern |= 1 << line;
        }
    }

    pub fn clear(&mut self, line: usize) {
        if let Some(led) = self.leds.get_mut(line) {
            led.set_low().ok();
            self.pattern &= !(1 << line);
        }
    }

    pub fn clear_all(&mut self) {
        for led in self.leds.iter_mut() {
            led.set_low().ok();
        }
        self.pattern = 0;
    }

    pub fn pattern(&self) -> u8 {
        self.pattern
    }

    pub fn release(self) -> [O; LINE_COUNT] {
        self.leds
    }
}
