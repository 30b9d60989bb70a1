//! Event dispatch: the one entry point every interrupt source funnels into

use crate::application::Simulator;
use crate::hal::Board;

/// Hardware conditions the peripheral layer raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ReceiverOverrun,
    ByteReceived(u8),
    TimerTick,
    TransmitReady,
    ConversionComplete,
    InputChange,
}

/// Conditions latched at the moment the dispatcher is entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pending {
    pub overrun: bool,
    pub received: Option<u8>,
    pub tick: bool,
    pub transmit_ready: bool,
    pub conversion_complete: bool,
    pub input_change: bool,
}

impl Pending {
    pub const fn none() -> Self {
        Self {
            overrun: false,
            received: None,
            tick: false,
            transmit_ready: false,
            conversion_complete: false,
            input_change: false,
        }
    }

    /// Latches `event` on top of what is already pending. A second byte
    /// replaces the first, like the single receive register it models.
    pub fn with(mut self, event: Event) -> Self {
        match event {
            Event::ReceiverOverrun => self.overrun = true,
            Event::ByteReceived(byte) => self.received = Some(byte),
            Event::TimerTick => self.tick = true,
            Event::TransmitReady => self.transmit_ready = true,
            Event::ConversionComplete => self.conversion_complete = true,
            Event::InputChange => self.input_change = true,
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }
}

impl From<Event> for Pending {
    fn from(event: Event) -> Self {
        Self::none().with(event)
    }
}

impl<B: Board> Simulator<B> {
    /// Services every pending condition, always in the same order: overrun
    /// recovery, received byte, tick, transmit-ready, conversion-complete,
    /// input change.
    ///
    /// Must not be re-entered; on the target it runs with interrupts masked.
    pub fn service(&mut self, pending: Pending) {
        if pending.overrun {
            self.on_receiver_overrun();
        }

        if let Some(byte) = pending.received {
            self.on_byte(byte);
        }

        if pending.tick {
            self.on_tick();
        }

        if pending.transmit_ready {
            self.on_transmit_ready();
        }

        // pending.conversion_complete: nothing to do, the altimeter collects
        // its conversions synchronously and the flag clears on vector entry.

        if pending.input_change {
            self.on_input_change();
        }
    }

    pub fn handle(&mut self, event: Event) {
        self.service(event.into());
    }
}
