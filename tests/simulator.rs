//! Drives the whole simulator through its event entry point on a fake board.

use core::convert::Infallible;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::serial;
use flight_simulator::diagnostics::Fault;
use flight_simulator::logger::{Log, LogType};
use flight_simulator::{Board, Event, InterruptControl, Mode, Parts, Pending, Simulator};

struct Wire(Rc<RefCell<Vec<u8>>>);

impl serial::Write<u8> for Wire {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        self.0.borrow_mut().push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

struct FakeAdc(Rc<Cell<u16>>);

struct AltitudeChannel;

impl Channel<FakeAdc> for AltitudeChannel {
    type ID = u8;

    fn channel() -> u8 {
        0
    }
}

impl OneShot<FakeAdc, u16, AltitudeChannel> for FakeAdc {
    type Error = Infallible;

    fn read(&mut self, _pin: &mut AltitudeChannel) -> nb::Result<u16, Infallible> {
        Ok(self.0.get())
    }
}

struct Line(Rc<Cell<bool>>);

impl InputPin for Line {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

impl OutputPin for Line {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

#[derive(Default)]
struct Switches {
    tick: bool,
    tick_arms: u32,
    transmit_ready: bool,
    input_change: bool,
    receiver_restarts: u32,
}

struct Control(Rc<RefCell<Switches>>);

impl InterruptControl for Control {
    fn restart_receiver(&mut self) {
        self.0.borrow_mut().receiver_restarts += 1;
    }

    fn set_tick_enabled(&mut self, enabled: bool) {
        let mut switches = self.0.borrow_mut();
        if enabled && !switches.tick {
            switches.tick_arms += 1;
        }
        switches.tick = enabled;
    }

    fn set_transmit_ready_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().transmit_ready = enabled;
    }

    fn set_input_change_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().input_change = enabled;
    }
}

#[derive(Default)]
struct Records(Vec<(LogType, String, u16)>);

impl Log for Records {
    fn log(&mut self, log_type: LogType, message: &str, value: u16) {
        self.0.push((log_type, message.to_string(), value));
    }
}

struct TestBoard;

impl Board for TestBoard {
    type Serial = Wire;
    type AdcKind = FakeAdc;
    type Adc = FakeAdc;
    type AltitudeChannel = AltitudeChannel;
    type Input = Line;
    type Output = Line;
    type Control = Control;
    type Log = Records;
}

struct Rig {
    sim: Simulator<TestBoard>,
    wire: Rc<RefCell<Vec<u8>>>,
    adc: Rc<Cell<u16>>,
    buttons: [Rc<Cell<bool>>; 4],
    leds: [Rc<Cell<bool>>; 4],
    switches: Rc<RefCell<Switches>>,
}

impl Rig {
    fn new() -> Self {
        let wire = Rc::new(RefCell::new(Vec::new()));
        let adc = Rc::new(Cell::new(0));
        let buttons: [Rc<Cell<bool>>; 4] = Default::default();
        let leds: [Rc<Cell<bool>>; 4] = Default::default();
        let switches = Rc::new(RefCell::new(Switches::default()));

        let sim = Simulator::new(Parts {
            serial: Wire(wire.clone()),
            adc: FakeAdc(adc.clone()),
            altitude_channel: AltitudeChannel,
            buttons: buttons.clone().map(Line),
            leds: leds.clone().map(Line),
            control: Control(switches.clone()),
            log: Records::default(),
        });

        Self {
            sim,
            wire,
            adc,
            buttons,
            leds,
            switches,
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.sim.handle(Event::ByteReceived(byte));
        }
    }

    /// Raises transmit-ready events for as long as the source stays armed.
    fn drain(&mut self) {
        for _ in 0..64 {
            if !self.switches.borrow().transmit_ready {
                return;
            }
            self.sim.handle(Event::TransmitReady);
        }
        panic!("transmitter never disarmed");
    }

    fn take_frames(&mut self) -> Vec<String> {
        let bytes = std::mem::take(&mut *self.wire.borrow_mut());
        String::from_utf8(bytes)
            .unwrap()
            .split_inclusive('#')
            .map(str::to_string)
            .collect()
    }

    fn command(&mut self, frame: &[u8]) -> Vec<String> {
        self.feed(frame);
        self.drain();
        self.take_frames()
    }

    fn tick(&mut self) -> Vec<String> {
        self.sim.handle(Event::TimerTick);
        self.drain();
        self.take_frames()
    }

    fn ticks(&mut self, count: usize) -> Vec<String> {
        (0..count).flat_map(|_| self.tick()).collect()
    }

    fn leds(&self) -> [bool; 4] {
        [0, 1, 2, 3].map(|i| self.leds[i].get())
    }
}

#[test]
fn distance_counts_down_at_the_set_speed() {
    let mut rig = Rig::new();
    assert!(rig.command(b"$SPD0002#").is_empty());
    assert!(rig.command(b"$GOO0010#").is_empty());
    assert_eq!(rig.sim.state().mode, Mode::Active);
    assert!(rig.switches.borrow().tick);

    assert_eq!(
        rig.ticks(8),
        [
            "$DST000E#", "$DST000C#", "$DST000A#", "$DST0008#", "$DST0006#", "$DST0004#",
            "$DST0002#", "$DST0000#",
        ]
    );
}

#[test]
fn distance_clamps_at_zero_and_keeps_reporting() {
    let mut rig = Rig::new();
    rig.command(b"$SPD0002#");
    rig.command(b"$GOO0003#");

    assert_eq!(rig.ticks(3), ["$DST0001#", "$DST0000#", "$DST0000#"]);
    assert_eq!(rig.sim.state().mode, Mode::Active);
    assert!(rig.sim.is_running());
}

#[test]
fn start_marker_resynchronizes_the_receiver() {
    let mut rig = Rig::new();
    rig.command(b"$AAA$GOO0010#");

    assert_eq!(rig.sim.state().distance, 0x0010);
    assert_eq!(rig.sim.state().mode, Mode::Active);
    assert_eq!(rig.sim.diagnostics().total(), 0);
}

#[test]
fn second_start_only_updates_distance() {
    let mut rig = Rig::new();
    rig.command(b"$ALT03E8#");
    rig.command(b"$GOO0100#");
    rig.ticks(3);
    assert_eq!(rig.sim.state().altitude_timer, 300);

    rig.command(b"$GOO0050#");
    assert_eq!(rig.sim.state().distance, 0x0050);
    assert_eq!(rig.sim.state().altitude_timer, 300);
    assert_eq!(rig.switches.borrow().tick_arms, 1);
}

#[test]
fn altitude_reports_replace_distance_reports_on_cadence() {
    let mut rig = Rig::new();
    rig.adc.set(600);
    rig.command(b"$SPD0001#");
    rig.command(b"$ALT00FA#");
    rig.command(b"$GOO0010#");

    assert_eq!(
        rig.ticks(6),
        ["$DST000F#", "$DST000E#", "$ALT2AF8#", "$DST000C#", "$DST000B#", "$ALT2AF8#"]
    );
    assert_eq!(rig.sim.state().altitude_timer, 0);
    // distance still advanced on the altitude ticks
    assert_eq!(rig.sim.state().distance, 0x000A);
}

#[test]
fn altitude_follows_the_analog_band() {
    let mut rig = Rig::new();
    rig.command(b"$ALT0064#");
    rig.command(b"$GOO0000#");

    let mut seen = Vec::new();
    for sample in [0, 255, 256, 767, 768, 1023] {
        rig.adc.set(sample);
        seen.extend(rig.tick());
    }
    assert_eq!(
        seen,
        ["$ALT2328#", "$ALT2328#", "$ALT2710#", "$ALT2AF8#", "$ALT2EE0#", "$ALT2EE0#"]
    );
}

#[test]
fn disabling_altitude_goes_back_to_distance() {
    let mut rig = Rig::new();
    rig.command(b"$ALT00C8#");
    rig.command(b"$GOO0001#");
    rig.tick();

    rig.command(b"$ALT0000#");
    assert_eq!(rig.ticks(4), ["$DST0001#"; 4]);
    assert_eq!(rig.sim.state().altitude_timer, 100);
}

#[test]
fn stop_acknowledges_once_and_silences_telemetry() {
    let mut rig = Rig::new();
    rig.command(b"$GOO0010#");
    rig.tick();

    assert_eq!(rig.command(b"$END#"), ["$END#"]);
    assert_eq!(rig.sim.state().mode, Mode::Ended);
    assert!(!rig.sim.is_running());
    assert!(!rig.switches.borrow().tick);

    assert!(rig.ticks(5).is_empty());
    assert!(rig.command(b"$GOO0020#").is_empty());
    assert_eq!(rig.sim.state().mode, Mode::Ended);
}

#[test]
fn stays_busy_until_the_stop_acknowledgement_drains() {
    let mut rig = Rig::new();
    rig.command(b"$GOO0010#");
    rig.feed(b"$END#");

    assert!(!rig.sim.is_running());
    assert!(rig.sim.is_transmitting());

    // Four of the five bytes out, still busy
    for _ in 0..4 {
        rig.sim.handle(Event::TransmitReady);
    }
    assert!(rig.sim.is_transmitting());

    rig.drain();
    assert!(!rig.sim.is_transmitting());
    assert!(!rig.switches.borrow().transmit_ready);
    assert_eq!(rig.take_frames(), ["$END#"]);
}

#[test]
fn stop_before_start_ends_immediately() {
    let mut rig = Rig::new();
    assert_eq!(rig.command(b"$END#"), ["$END#"]);
    rig.command(b"$GOO0010#");

    assert_eq!(rig.sim.state().mode, Mode::Ended);
    assert_eq!(rig.switches.borrow().tick_arms, 0);
    assert!(rig.ticks(2).is_empty());
}

#[test]
fn new_message_cuts_off_the_one_in_flight() {
    let mut rig = Rig::new();
    rig.command(b"$GOO1234#");
    rig.sim.handle(Event::TimerTick);
    for _ in 0..3 {
        rig.sim.handle(Event::TransmitReady);
    }

    assert_eq!(rig.command(b"$END#").concat(), "$DS$END#");
    assert_eq!(rig.sim.diagnostics().count(Fault::MessageOverwritten), 1);
}

#[test]
fn outputs_follow_led_commands_only_in_manual_mode() {
    let mut rig = Rig::new();
    rig.command(b"$LED01#");
    assert_eq!(rig.leds(), [false; 4]);

    rig.command(b"$MAN01#");
    assert!(rig.sim.state().manual_override);
    assert!(rig.switches.borrow().input_change);

    rig.command(b"$LED02#");
    rig.command(b"$LED04#");
    assert_eq!(rig.leds(), [false, true, false, true]);
    assert_eq!(rig.sim.outputs(), 0b1010);

    rig.command(b"$LED05#");
    assert_eq!(rig.leds(), [false, true, false, true]);

    rig.command(b"$LED00#");
    assert_eq!(rig.leds(), [false; 4]);
}

#[test]
fn manual_mode_needs_exactly_one() {
    let mut rig = Rig::new();
    rig.command(b"$MAN01#");
    rig.command(b"$MAN02#");
    assert!(!rig.sim.state().manual_override);
    assert!(!rig.switches.borrow().input_change);

    rig.command(b"$LED01#");
    assert_eq!(rig.leds(), [false; 4]);
}

#[test]
fn button_press_is_reported_and_clears_its_output() {
    let mut rig = Rig::new();
    rig.command(b"$MAN01#");
    rig.command(b"$LED01#");
    rig.command(b"$LED02#");

    rig.buttons[1].set(true);
    rig.buttons[3].set(true);
    rig.sim.handle(Event::InputChange);
    rig.drain();

    assert_eq!(rig.take_frames(), ["$PRS05#"]);
    assert_eq!(rig.sim.state().last_pressed, 5);
    assert_eq!(rig.leds(), [true, false, false, false]);
}

#[test]
fn input_change_with_nothing_pressed_is_silent() {
    let mut rig = Rig::new();
    rig.command(b"$MAN01#");
    rig.buttons[0].set(true);
    rig.sim.handle(Event::InputChange);
    rig.drain();
    assert_eq!(rig.take_frames(), ["$PRS04#"]);

    rig.buttons[0].set(false);
    rig.sim.handle(Event::InputChange);
    rig.drain();
    assert!(rig.take_frames().is_empty());
    assert_eq!(rig.sim.state().last_pressed, 4);
}

#[test]
fn bad_frames_are_ignored_silently() {
    let mut rig = Rig::new();
    rig.command(b"$SPD0007#");

    assert!(rig.command(b"$XYZ0001#").is_empty());
    assert!(rig.command(b"$SPDZZZZ#").is_empty());
    assert_eq!(rig.sim.state().speed, 7);

    assert!(rig.command(b"$SPD000012345678#").is_empty());
    assert_eq!(rig.sim.state().speed, 0);

    let diagnostics = rig.sim.diagnostics();
    assert_eq!(diagnostics.count(Fault::UnknownOpcode), 1);
    assert_eq!(diagnostics.count(Fault::MalformedPayload), 1);
    assert_eq!(diagnostics.count(Fault::FrameOverflow), 7);
}

#[test]
fn truncated_frames_are_not_counted_as_unknown_opcodes() {
    let mut rig = Rig::new();

    assert!(rig.command(b"$GO#").is_empty());
    assert!(rig.command(b"#").is_empty());
    assert!(rig.command(b"$GOO#").is_empty());

    let diagnostics = rig.sim.diagnostics();
    assert_eq!(diagnostics.count(Fault::InvalidFrame), 2);
    assert_eq!(diagnostics.count(Fault::UnknownOpcode), 0);
    assert_eq!(diagnostics.count(Fault::MalformedPayload), 1);
    assert_eq!(rig.sim.state().mode, Mode::Active);
}

#[test]
fn commands_are_logged_under_their_mnemonic() {
    let mut rig = Rig::new();
    rig.command(b"$SPD0003#");
    rig.command(b"$LED01#");
    rig.command(b"$MAN01#");

    let commands: Vec<_> = rig
        .sim
        .log()
        .0
        .iter()
        .filter(|(kind, _, _)| *kind == LogType::Command)
        .map(|(_, message, value)| (message.as_str(), *value))
        .collect();
    // LED outside manual mode is ignored and not logged
    assert_eq!(commands, [("SPD", 3), ("MAN", 1)]);
}

#[test]
fn receiver_overrun_restarts_the_receiver() {
    let mut rig = Rig::new();
    rig.sim.handle(Event::ReceiverOverrun);

    assert_eq!(rig.switches.borrow().receiver_restarts, 1);
    assert_eq!(rig.sim.diagnostics().count(Fault::ReceiverOverrun), 1);
    let faults: Vec<_> = rig
        .sim
        .log()
        .0
        .iter()
        .filter(|(kind, _, _)| *kind == LogType::Error)
        .collect();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].1, "receiver overrun");
}

#[test]
fn byte_latched_with_an_overrun_is_still_handled() {
    let mut rig = Rig::new();
    rig.command(b"$GOO0010#");
    rig.feed(b"$END");

    let pending = Pending::from(Event::ReceiverOverrun).with(Event::ByteReceived(b'#'));
    rig.sim.service(pending);
    rig.drain();

    assert_eq!(rig.switches.borrow().receiver_restarts, 1);
    assert_eq!(rig.sim.diagnostics().count(Fault::ReceiverOverrun), 1);
    assert_eq!(rig.take_frames(), ["$END#"]);
    assert_eq!(rig.sim.state().mode, Mode::Ended);
}

#[test]
fn pending_conditions_are_serviced_in_order() {
    let mut rig = Rig::new();
    rig.command(b"$GOO0010#");
    rig.feed(b"$END");

    // The completing byte is handled before the tick in the same invocation
    let pending = Pending::from(Event::TimerTick)
        .with(Event::ByteReceived(b'#'))
        .with(Event::ConversionComplete);
    rig.sim.service(pending);
    rig.drain();

    assert_eq!(rig.take_frames(), ["$END#"]);
}

#[test]
fn ticks_before_start_do_nothing() {
    let mut rig = Rig::new();
    assert!(rig.ticks(3).is_empty());
    assert_eq!(rig.sim.state().mode, Mode::Idle);
}

#[test]
fn spurious_transmit_ready_disarms_the_source() {
    let mut rig = Rig::new();
    rig.switches.borrow_mut().transmit_ready = true;
    rig.sim.handle(Event::TransmitReady);

    assert!(!rig.switches.borrow().transmit_ready);
    assert!(rig.take_frames().is_empty());
}
