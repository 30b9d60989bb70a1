//! Vehicle instrumentation simulator for a hardware-in-the-loop rig
//!
//! A tester drives the simulator over a serial link with `$OPC<hex>#` frames
//! and receives distance, altitude, and button-press telemetry back.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod application;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod hal;
pub mod logger;
pub mod os;
pub mod protocol;

pub use application::{Mode, Parts, Simulator, VehicleState};
pub use hal::{Board, InterruptControl};
pub use os::{Event, Pending};
