#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
use avr_device::interrupt::{self, Mutex};
#[cfg(target_arch = "avr")]
use core::cell::RefCell;
#[cfg(target_arch = "avr")]
use flight_simulator::config::TICK_PERIOD_MS;
#[cfg(target_arch = "avr")]
use flight_simulator::hal::{self, uart, Atmega128, Power};
#[cfg(target_arch = "avr")]
use flight_simulator::{Event, Pending, Simulator};

// Shared with the interrupt handlers
#[cfg(target_arch = "avr")]
static SIMULATOR: Mutex<RefCell<Option<Simulator<Atmega128>>>> =
    Mutex::new(RefCell::new(None));

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    hal::configure_serial();
    hal::configure_timer(TICK_PERIOD_MS);
    hal::configure_analog_input();
    hal::configure_digital_lines();

    let simulator = Simulator::new(Atmega128::parts());
    interrupt::free(|cs| {
        SIMULATOR.borrow(cs).replace(Some(simulator));
    });

    // Interrupts stay masked from each check until the sleep instruction
    let mut power = Power::new();
    loop {
        interrupt::disable();
        let busy = interrupt::free(|cs| {
            SIMULATOR
                .borrow(cs)
                .borrow()
                .as_ref()
                .map_or(false, |sim| sim.is_running() || sim.is_transmitting())
        });
        if !busy {
            break;
        }
        power.idle_enabling_interrupts();
    }

    // Stopped and the acknowledgement is out; interrupts are still masked
    loop {
        power.enter_power_down();
    }
}

#[cfg(target_arch = "avr")]
fn service(pending: Pending) {
    interrupt::free(|cs| {
        if let Some(sim) = SIMULATOR.borrow(cs).borrow_mut().as_mut() {
            sim.service(pending);
        }
    });
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn USART0_RX() {
    service(uart::receive_pending());
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn USART0_UDRE() {
    service(Event::TransmitReady.into());
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn TIMER1_COMPA() {
    service(Event::TimerTick.into());
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn ADC() {
    service(Event::ConversionComplete.into());
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn INT4() {
    service(Event::InputChange.into());
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn INT5() {
    service(Event::InputChange.into());
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn INT6() {
    service(Event::InputChange.into());
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega128a)]
fn INT7() {
    service(Event::InputChange.into());
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    eprintln!("flight_simulator runs on the ATmega128; build with --target avr-atmega128");
}
