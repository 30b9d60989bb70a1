use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds only run the test suite; nothing to link for them.
    let target = env::var("TARGET").unwrap();
    if !target.contains("avr") {
        return;
    }

    // Configure for ATmega128
    println!("cargo:rustc-link-arg=-mmcu=atmega128");

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");

    if env::var("CARGO_FEATURE_DEBUG").is_ok() {
        println!("cargo:warning=Debug log enabled on USART1");
    }

    println!("cargo:warning=Building flight simulator for ATmega128 at 16MHz");
}
