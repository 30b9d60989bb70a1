use crate::config::{tick_compare, TICK_PRESCALER};
use avr_device::atmega128a::TC1;

// TCCR1B
const WGM12: u8 = 1 << 3;

// TIMSK
const OCIE1A: u8 = 1 << 4;

#[derive(Clone, Copy)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

impl Prescaler {
    pub fn from_divider(divider: u32) -> Self {
        match divider {
            1 => Prescaler::Direct,
            8 => Prescaler::Div8,
            64 => Prescaler::Div64,
            256 => Prescaler::Div256,
            1024 => Prescaler::Div1024,
            _ => Prescaler::Stop,
        }
    }
}

/// Timer1 in clear-on-compare mode, one compare-match interrupt per tick.
pub struct TickTimer;

impl TickTimer {
    /// Starts counting; the interrupt stays masked until enabled.
    pub fn configure(period_ms: u16) {
        let compare = tick_compare(period_ms);
        let clock = Prescaler::from_divider(TICK_PRESCALER) as u8;
        unsafe {
            let p = TC1::ptr();
            (*p).tccr1a.write(|w| w.bits(0));
            (*p).ocr1a.write(|w| w.bits(compare));
            (*p).tcnt1.write(|w| w.bits(0));
            (*p).tccr1b.write(|w| w.bits(WGM12 | clock));
        }
    }

    /// Unmasks the tick, restarting the period so the first tick is whole.
    pub fn enable_interrupt() {
        unsafe {
            let p = TC1::ptr();
            (*p).tcnt1.write(|w| w.bits(0));
            (*p).timsk.modify(|r, w| w.bits(r.bits() | OCIE1A));
        }
    }

    pub fn disable_interrupt() {
        unsafe {
            let p = TC1::ptr();
            (*p).timsk.modify(|r, w| w.bits(r.bits() & !OCIE1A));
        }
    }
}
