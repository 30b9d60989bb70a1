//! Altitude from a 10-bit analog sample
//!
//! The sample is split into four equal bands, each reported as a fixed
//! altitude in feet.

use core::marker::PhantomData;
use embedded_hal::adc::{Channel, OneShot};

/// Conversions are 10 bits wide.
pub const SAMPLE_MASK: u16 = 0x03FF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AltitudeBand {
    Low,
    Mid,
    High,
    Top,
}

impl AltitudeBand {
    pub fn from_sample(sample: u16) -> Self {
        match sample & SAMPLE_MASK {
            768..=1023 => AltitudeBand::Top,
            512..=767 => AltitudeBand::High,
            256..=511 => AltitudeBand::Mid,
            _ => AltitudeBand::Low,
        }
    }

    pub fn feet(self) -> u16 {
        match self {
            AltitudeBand::Low => 9000,
            AltitudeBand::Mid => 10000,
            AltitudeBand::High => 11000,
            AltitudeBand::Top => 12000,
        }
    }
}

pub fn map_to_altitude(sample: u16) -> u16 {
    AltitudeBand::from_sample(sample).feet()
}

pub struct Altimeter<ADC, A, P> {
    adc: A,
    channel: P,
    _adc: PhantomData<ADC>,
}

impl<ADC, A, P> Altimeter<ADC, A, P>
where
    A: OneShot<ADC, u16, P>,
    P: Channel<ADC>,
{
    pub fn new(adc: A, channel: P) -> Self {
        Self {
            adc,
            channel,
            _adc: PhantomData,
        }
    }

    /// Starts a conversion and spins until it completes.
    pub fn sample(&mut self) -> Result<u16, A::Error> {
        nb::block!(self.adc.read(&mut self.channel)).map(|raw| raw & SAMPLE_MASK)
    }

    pub fn read_altitude(&mut self) -> Result<u16, A::Error> {
        self.sample().map(map_to_altitude)
    }

    pub fn release(self) -> (A, P) {
        (self.adc, self.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeAdc {
        value: u16,
        busy_polls: u8,
        polls: u32,
    }

    struct Channel0;

    impl Channel<FakeAdc> for Channel0 {
        type ID = u8;

        fn channel() -> u8 {
            0
        }
    }

    impl OneShot<FakeAdc, u16, Channel0> for FakeAdc {
        type Error = ();

        fn read(&mut self, _pin: &mut Channel0) -> nb::Result<u16, ()> {
            self.polls += 1;
            if self.busy_polls > 0 {
                self.busy_polls -= 1;
                return Err(nb::Error::WouldBlock);
            }
            Ok(self.value)
        }
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(map_to_altitude(0), 9000);
        assert_eq!(map_to_altitude(255), 9000);
        assert_eq!(map_to_altitude(256), 10000);
        assert_eq!(map_to_altitude(511), 10000);
        assert_eq!(map_to_altitude(512), 11000);
        assert_eq!(map_to_altitude(767), 11000);
        assert_eq!(map_to_altitude(768), 12000);
        assert_eq!(map_to_altitude(1023), 12000);
    }

    #[test]
    fn mapping_is_a_non_decreasing_step() {
        let mut previous = map_to_altitude(0);
        let mut steps = 0;
        for sample in 1..=1023 {
            let altitude = map_to_altitude(sample);
            assert!(altitude >= previous);
            if altitude != previous {
                steps += 1;
            }
            previous = altitude;
        }
        assert_eq!(steps, 3);
    }

    #[test]
    fn sample_waits_for_conversion() {
        let adc = FakeAdc {
            value: 0x0300,
            busy_polls: 5,
            polls: 0,
        };
        let mut altimeter = Altimeter::new(adc, Channel0);

        assert_eq!(altimeter.read_altitude(), Ok(12000));
        let (adc, _) = altimeter.release();
        assert_eq!(adc.polls, 6);
    }

    #[test]
    fn sample_keeps_ten_bits() {
        let adc = FakeAdc {
            value: 0xFC00 | 0x0100,
            busy_polls: 0,
            polls: 0,
        };
        let mut altimeter = Altimeter::new(adc, Channel0);
        assert_eq!(altimeter.sample(), Ok(0x0100));
    }
}
