use avr_device::atmega128a::CPU;

// MCUCR: SE is bit 5, SM1/SM0/SM2 are bits 4..2
const SE: u8 = 1 << 5;
const SM_MASK: u8 = 0x1C;

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum SleepMode {
    Idle = 0x00,
    AdcNoiseReduction = 0x08,
    PowerDown = 0x10,
    PowerSave = 0x18,
}

pub struct Power {
    _private: (),
}

impl Power {
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    pub fn set_sleep_mode(&mut self, mode: SleepMode) {
        unsafe {
            let p = CPU::ptr();
            (*p).mcucr.modify(|r, w| w.bits((r.bits() & !SM_MASK) | mode as u8));
        }
    }

    fn sleep_once(&mut self) {
        unsafe {
            let p = CPU::ptr();
            (*p).mcucr.modify(|r, w| w.bits(r.bits() | SE));
            avr_device::asm::sleep();
            (*p).mcucr.modify(|r, w| w.bits(r.bits() & !SE));
        }
    }

    /// Idle sleep, peripherals keep running. Entered with interrupts disabled. They are enabled by the
    /// instruction right before `sleep`, so an interrupt pending at that
    /// point still wakes the part. Interrupts are left enabled.
    pub fn idle_enabling_interrupts(&mut self) {
        self.set_sleep_mode(SleepMode::Idle);
        unsafe {
            let p = CPU::ptr();
            (*p).mcucr.modify(|r, w| w.bits(r.bits() | SE));
            core::arch::asm!("sei", "sleep");
            (*p).mcucr.modify(|r, w| w.bits(r.bits() & !SE));
        }
    }

    /// Deepest sleep; only an external interrupt or reset wakes the part.
    pub fn enter_power_down(&mut self) {
        self.set_sleep_mode(SleepMode::PowerDown);
        self.sleep_once();
    }
}

impl Default for Power {
    fn default() -> Self {
        Self::new()
    }
}
