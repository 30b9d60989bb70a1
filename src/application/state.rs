//! Simulated vehicle state

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Active,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleState {
    pub mode: Mode,
    /// Remaining distance units
    pub distance: u16,
    /// Units consumed per tick
    pub speed: u16,
    /// Milliseconds between altitude reports, 0 disables them
    pub altitude_period: u16,
    /// Milliseconds accumulated since the last altitude report
    pub altitude_timer: u16,
    pub manual_override: bool,
    /// Code of the last reported button, 0 before the first press
    pub last_pressed: u8,
}

impl VehicleState {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Idle,
            distance: 0,
            speed: 0,
            altitude_period: 0,
            altitude_timer: 0,
            manual_override: false,
            last_pressed: 0,
        }
    }

    pub fn altitude_enabled(&self) -> bool {
        self.altitude_period != 0
    }

    /// Moves the vehicle by one tick. Distance stops at zero; the
    /// simulation keeps running.
    pub fn advance(&mut self) {
        self.distance = self.distance.saturating_sub(self.speed);
    }

    /// Adds `elapsed_ms` to the altitude accumulator and reports whether an
    /// altitude reading is due. The accumulator restarts from zero when it is.
    pub fn altitude_due(&mut self, elapsed_ms: u16) -> bool {
        if !self.altitude_enabled() {
            return false;
        }

        self.altitude_timer = self.altitude_timer.saturating_add(elapsed_ms);
        if self.altitude_timer >= self.altitude_period {
            self.altitude_timer = 0;
            true
        } else {
            false
        }
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new()
    }
}
