//! Configuration constants for the flight simulator firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// Protocol link baud rate (USART0)
pub const UART_BAUD: u32 = 115_200;

/// Debug log baud rate (USART1)
pub const DEBUG_BAUD: u32 = 9600;

/// Period of the telemetry tick in milliseconds
pub const TICK_PERIOD_MS: u16 = 100;

/// Timer1 prescaler used for the telemetry tick
pub const TICK_PRESCALER: u32 = 256;

/// Timer1 compare value giving one tick every `period_ms`, saturating at the
/// 16-bit limit.
pub const fn tick_compare(period_ms: u16) -> u16 {
    let counts = (CPU_FREQ_HZ / TICK_PRESCALER) * period_ms as u32 / 1000;
    let compare = counts.saturating_sub(1);
    if compare > u16::MAX as u32 {
        u16::MAX
    } else {
        compare as u16
    }
}

/// Command frame capacity in bytes, including the start marker
pub const FRAME_CAPACITY: usize = 10;

/// Outbound message capacity in bytes
pub const MESSAGE_CAPACITY: usize = 10;

/// Frame start marker
pub const START_MARKER: u8 = b'$';

/// Frame end marker
pub const END_MARKER: u8 = b'#';

/// Number of digital input/output lines
pub const LINE_COUNT: usize = 4;
