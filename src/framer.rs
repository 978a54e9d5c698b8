//! Segmentation of a level sequence into data pulse widths.
//!
//! A DHT11 transmission, after the host releases the line, looks like this:
//!
//! ```text
//!  release  response        bit 0          bit 1              bit 39   end
//!  ‾‾‾‾‾‾|________|‾‾‾‾‾‾‾‾|_____|‾‾|_____|‾‾‾‾‾‾‾|  ...  |_____|‾‾|_____|‾‾‾ idle
//!        80 µs     80 µs    50 µs  26-28 µs     70 µs
//! ```
//!
//! Only the high phase of each bit carries data, so the framer measures those, in samples.

use crate::DecodeError;
use crate::hw_def::PULSE_COUNT;
use crate::types::Level;

#[cfg(feature = "defmt")]
use defmt::Format;

/// Position of the framer in a transmission; each state waits for one level
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FramerState {
    /// waiting for the sensor to pull the released line low
    InitPullDown,
    /// waiting for the sensor to release its response low
    InitPullUp,
    /// waiting for the low phase of the first bit
    DataFirstPullDown,
    /// waiting for the high phase of a bit
    DataPullUp,
    /// measuring a high phase until the line falls
    DataPullDown,
}

/// Streaming pulse framer, fed one sample at a time
#[derive(Clone, Debug)]
pub struct PulseFramer {
    state: FramerState,
    length: u32,
    pulses: [u32; PULSE_COUNT],
    count: usize,
}

impl Default for PulseFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseFramer {
    /// Framer waiting for the start of a transmission
    pub const fn new() -> Self {
        Self {
            state: FramerState::InitPullDown,
            length: 0,
            pulses: [0; PULSE_COUNT],
            count: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Number of data pulses measured so far, including any beyond [`PULSE_COUNT`]
    pub fn pulse_count(&self) -> usize {
        self.count
    }

    /// Consume one sample
    pub fn push(&mut self, level: Level) {
        self.length = self.length.saturating_add(1);
        self.state = match self.state {
            FramerState::InitPullDown => Self::init_pull_down(level),
            FramerState::InitPullUp => Self::init_pull_up(level),
            FramerState::DataFirstPullDown => Self::data_first_pull_down(level),
            FramerState::DataPullUp => self.data_pull_up(level),
            FramerState::DataPullDown => self.data_pull_down(level),
        };
    }

    /// The measured high-pulse widths, if exactly [`PULSE_COUNT`] were seen
    pub fn finish(&self) -> Result<[u32; PULSE_COUNT], DecodeError> {
        if self.count != PULSE_COUNT {
            trace!("dht11::framer: {} pulses, final state {}", self.count, self.state as u8);
            return Err(DecodeError::Framing { pulses: self.count });
        }
        Ok(self.pulses)
    }

    fn init_pull_down(level: Level) -> FramerState {
        match level {
            Level::Low => FramerState::InitPullUp,
            Level::High => FramerState::InitPullDown,
        }
    }

    fn init_pull_up(level: Level) -> FramerState {
        match level {
            Level::High => FramerState::DataFirstPullDown,
            Level::Low => FramerState::InitPullUp,
        }
    }

    fn data_first_pull_down(level: Level) -> FramerState {
        match level {
            Level::Low => FramerState::DataPullUp,
            Level::High => FramerState::DataFirstPullDown,
        }
    }

    fn data_pull_up(&mut self, level: Level) -> FramerState {
        match level {
            Level::High => {
                self.length = 0;
                FramerState::DataPullDown
            }
            Level::Low => FramerState::DataPullUp,
        }
    }

    fn data_pull_down(&mut self, level: Level) -> FramerState {
        match level {
            Level::Low => {
                if let Some(slot) = self.pulses.get_mut(self.count) {
                    *slot = self.length;
                }
                self.count = self.count.saturating_add(1);
                FramerState::DataPullUp
            }
            Level::High => FramerState::DataPullDown,
        }
    }
}

/// Run a complete sample sequence through a [`PulseFramer`]
pub fn frame<I: IntoIterator<Item = Level>>(samples: I) -> Result<[u32; PULSE_COUNT], DecodeError> {
    let mut framer = PulseFramer::new();
    samples.into_iter().for_each(|level| framer.push(level));
    framer.finish()
}
