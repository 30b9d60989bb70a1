//! Vehicle simulation driven by tester commands and the telemetry tick
//!
//! [`Simulator`] is the single owner of every piece of mutable state. All
//! handlers run from `Simulator::service`, one interrupt at a time.

pub mod state;

pub use state::{Mode, VehicleState};

use crate::config::{LINE_COUNT, TICK_PERIOD_MS};
use crate::diagnostics::{Diagnostics, Fault};
use crate::drivers::{map_to_altitude, Altimeter, ButtonHandler, LedMatrix, Transmitter, TxStatus};
use crate::hal::{Board, InterruptControl};
use crate::logger::Log;
use crate::protocol::{Command, FrameEvent, FrameReceiver, ProtocolError, Report};

/// Peripherals handed over to the simulator at start-up.
pub struct Parts<B: Board> {
    pub serial: B::Serial,
    pub adc: B::Adc,
    pub altitude_channel: B::AltitudeChannel,
    pub buttons: [B::Input; LINE_COUNT],
    pub leds: [B::Output; LINE_COUNT],
    pub control: B::Control,
    pub log: B::Log,
}

pub struct Simulator<B: Board> {
    state: VehicleState,
    frame: FrameReceiver,
    transmitter: Transmitter<B::Serial>,
    altimeter: Altimeter<B::AdcKind, B::Adc, B::AltitudeChannel>,
    buttons: ButtonHandler<B::Input>,
    leds: LedMatrix<B::Output>,
    control: B::Control,
    log: B::Log,
    diagnostics: Diagnostics,
    running: bool,
}

impl<B: Board> Simulator<B> {
    pub fn new(parts: Parts<B>) -> Self {
        let mut log = parts.log;
        log.log_system("ready", 0);

        Self {
            state: VehicleState::new(),
            frame: FrameReceiver::new(),
            transmitter: Transmitter::new(parts.serial),
            altimeter: Altimeter::new(parts.adc, parts.altitude_channel),
            buttons: ButtonHandler::new(parts.buttons),
            leds: LedMatrix::new(parts.leds),
            control: parts.control,
            log,
            diagnostics: Diagnostics::new(),
            running: true,
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Levels last written to the output lines, bit `n` for line `n`.
    pub fn outputs(&self) -> u8 {
        self.leds.pattern()
    }

    pub fn control(&self) -> &B::Control {
        &self.control
    }

    pub fn log(&self) -> &B::Log {
        &self.log
    }

    /// False once a stop command has been handled.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_transmitting(&self) -> bool {
        self.transmitter.is_busy()
    }

    /// Runs the handler for one decoded command and logs it under its
    /// mnemonic. Ignored commands are not logged.
    pub fn execute(&mut self, command: Command) {
        if command.is_malformed() {
            self.fault(Fault::MalformedPayload);
        }

        let logged = match command {
            Command::Start(distance) => Some(self.start(distance)),
            Command::Stop => Some(self.stop()),
            Command::SetSpeed(speed) => {
                if let Some(speed) = speed {
                    self.state.speed = speed;
                }
                Some(self.state.speed)
            }
            Command::SetAltitudePeriod(period) => {
                if let Some(period) = period {
                    self.state.altitude_period = period;
                }
                Some(self.state.altitude_period)
            }
            Command::SetManual(flag) => Some(self.set_manual(flag)),
            Command::SetOutput(index) => self.set_output(index),
        };

        if let Some(value) = logged {
            self.log.log_command(command.opcode().mnemonic(), value);
        }
    }

    fn start(&mut self, distance: Option<u16>) -> u16 {
        if self.state.mode == Mode::Idle {
            self.state.mode = Mode::Active;
            self.control.set_tick_enabled(true);
            self.log.log_system("active", TICK_PERIOD_MS);
        }
        if let Some(distance) = distance {
            self.state.distance = distance;
        }
        self.state.distance
    }

    fn stop(&mut self) -> u16 {
        self.state.mode = Mode::Ended;
        self.control.set_tick_enabled(false);
        self.send(Report::StopAck);
        self.running = false;
        self.state.distance
    }

    fn set_manual(&mut self, flag: Option<u8>) -> u16 {
        if let Some(flag) = flag {
            self.state.manual_override = flag == 1;
        }
        self.control.set_input_change_enabled(self.state.manual_override);
        self.state.manual_override as u16
    }

    /// Returns the new output pattern, or `None` when the command is ignored.
    fn set_output(&mut self, index: Option<u8>) -> Option<u16> {
        if !self.state.manual_override {
            return None;
        }
        match index {
            Some(0) => self.leds.clear_all(),
            Some(line @ 1..=4) => self.leds.set(line as usize - 1),
            _ => return None,
        }
        Some(self.leds.pattern() as u16)
    }

    pub(crate) fn on_byte(&mut self, byte: u8) {
        let parsed = match self.frame.push(byte) {
            FrameEvent::Partial => return,
            FrameEvent::Overflow => None,
            FrameEvent::Complete(frame) => Some(Command::parse(frame)),
        };

        match parsed {
            Some(Ok(command)) => self.execute(command),
            Some(Err(ProtocolError::UnknownOpcode)) => self.fault(Fault::UnknownOpcode),
            Some(Err(ProtocolError::InvalidFrame)) => self.fault(Fault::InvalidFrame),
            // Parsing never fills a buffer
            Some(Err(ProtocolError::BufferOverflow)) => {}
            None => self.fault(Fault::FrameOverflow),
        }
    }

    pub(crate) fn on_tick(&mut self) {
        if self.state.mode != Mode::Active {
            return;
        }

        self.state.advance();
        let report = if self.state.altitude_due(TICK_PERIOD_MS) {
            Report::Altitude(self.read_altitude())
        } else {
            Report::Distance(self.state.distance)
        };
        self.send(report);
    }

    pub(crate) fn on_transmit_ready(&mut self) {
        match self.transmitter.on_ready() {
            TxStatus::Sent(_) => {}
            TxStatus::Idle | TxStatus::Drained => self.control.set_transmit_ready_enabled(false),
        }
    }

    pub(crate) fn on_input_change(&mut self) {
        if let Some(button) = self.buttons.poll() {
            self.leds.clear(button.output_line());
            self.state.last_pressed = button.code();
            self.send(Report::Press(button.code()));
        }
    }

    pub(crate) fn on_receiver_overrun(&mut self) {
        self.control.restart_receiver();
        self.fault(Fault::ReceiverOverrun);
    }

    fn read_altitude(&mut self) -> u16 {
        match self.altimeter.read_altitude() {
            Ok(feet) => {
                self.log.log_telemetry("altitude", feet);
                feet
            }
            Err(_) => {
                self.fault(Fault::SampleFailed);
                map_to_altitude(0)
            }
        }
    }

    fn send(&mut self, report: Report) {
        if self.transmitter.send(report) {
            self.fault(Fault::MessageOverwritten);
        }
        self.control.set_transmit_ready_enabled(true);
    }

    fn fault(&mut self, fault: Fault) {
        let count = self.diagnostics.record(fault);
        self.log.log_error(fault.describe(), count);
    }
}
