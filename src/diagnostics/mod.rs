//! Fault accounting for silently recovered errors
//!
//! Nothing here is reported to the tester: every fault is recovered where it
//! happens. The counters only feed the debug log and host tests.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Fault {
    /// Frame with an opcode outside the command set
    UnknownOpcode = 0x01,
    /// Frame whose payload held no hex digits
    MalformedPayload = 0x02,
    /// Bytes dropped because the frame buffer was full
    FrameOverflow = 0x03,
    /// Hardware receive overrun, receiver restarted
    ReceiverOverrun = 0x04,
    /// New message replaced one still being transmitted
    MessageOverwritten = 0x05,
    /// Analog conversion reported an error
    SampleFailed = 0x06,
    /// Frame terminated before a full opcode
    InvalidFrame = 0x07,
}

const FAULT_KINDS: usize = 7;

impl Fault {
    pub const ALL: [Fault; FAULT_KINDS] = [
        Fault::UnknownOpcode,
        Fault::MalformedPayload,
        Fault::FrameOverflow,
        Fault::ReceiverOverrun,
        Fault::MessageOverwritten,
        Fault::SampleFailed,
        Fault::InvalidFrame,
    ];

    fn index(self) -> usize {
        self as usize - 1
    }

    pub fn describe(self) -> &'static str {
        match self {
            Fault::UnknownOpcode => "unknown opcode",
            Fault::MalformedPayload => "malformed payload",
            Fault::FrameOverflow => "frame overflow",
            Fault::ReceiverOverrun => "receiver overrun",
            Fault::MessageOverwritten => "message overwritten",
            Fault::SampleFailed => "sample failed",
            Fault::InvalidFrame => "invalid frame",
        }
    }
}

pub struct Diagnostics {
    counts: [u16; FAULT_KINDS],
    last_fault: Option<Fault>,
}

impl Diagnostics {
    pub const fn new() -> Self {
        Self {
            counts: [0; FAULT_KINDS],
            last_fault: None,
        }
    }

    /// Counts one occurrence and returns the new count for that fault.
    pub fn record(&mut self, fault: Fault) -> u16 {
        let count = &mut self.counts[fault.index()];
        *count = count.saturating_add(1);
        self.last_fault = Some(fault);
        *count
    }

    pub fn count(&self, fault: Fault) -> u16 {
        self.counts[fault.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }

    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}
