//! This is a platform-agnostic Rust driver for the DHT11 single-wire humidity and temperature
//! sensor using the [`embedded-hal`] or [`embedded-hal-async`] traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async
//!
//! The DHT11 answers a start pulse with 40 data bits whose values are encoded in the width of
//! high pulses (about 26 µs for a `0`, 70 µs for a `1`). This driver does not time those pulses
//! with a hardware timer or an interrupt. It polls the line as fast as the platform allows and
//! measures each pulse in samples:
//!
//! 1. [`Sampler`]: issue the start condition, then poll until the line has not changed for
//!    [`Config::idle_threshold`] samples.
//! 2. [`PulseFramer`]: a state machine that turns the samples into 40 high-pulse widths.
//! 3. [`decode`]: split the widths around the midpoint of the shortest and longest pulse of the
//!    capture, pack them into 5 bytes and check the sum.
//!
//! Because the bit threshold is calibrated from every capture, the driver works at any
//! polling speed that resolves the two pulse widths.
//!
//! This driver allows you to:
//! - Read humidity and temperature, blocking or async.
//! - Retry failed cycles with a cooldown until a valid frame arrives.
//! - Inspect the raw frame, fractional bytes included.
//! - Feed recorded or synthetic samples through the framer and decoder without hardware.
//!
//! ## Features
//!
//! - `async`: Enables async API.
//! - `blocking`: Enables blocking API.
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! The capture runs inside a [`critical_section`], so the final binary must provide a
//! critical-section implementation (most HALs do).
//!
//! The line must be an open-drain pin with a pull-up (4.7 kΩ is common), implementing both
//! `InputPin` and `OutputPin`. Driving it high releases it.
//!
//! ## Blocking Example:
//!
//! ```ignore
//! use dht11_poll::{Config, Dht11};
//!
//! // Platform-specific
//! let pin = /* embedded_hal::digital::InputPin + OutputPin, open drain */;
//! let delay = /* embedded_hal::delay::DelayNs instance */;
//!
//! let mut dht11 = Dht11::with_config(pin, delay, Config::dht11());
//!
//! loop {
//!     match dht11.read() {
//!         Ok(reading) => println!("{reading}"),
//!         Err(e) if e.is_recoverable() => {}
//!         Err(e) => panic!("sensor line unusable: {e:?}"),
//!     }
//!     // Platform-specific: the DHT11 needs about 1 s between reads
//!     sleep_secs(2);
//! }
//! ```
//!
//! ## Async Example:
//!
//! ```ignore
//! use dht11_poll::Dht11;
//!
//! // Platform-specific
//! let pin = /* embedded_hal::digital::InputPin + OutputPin, open drain */;
//! let delay = /* embedded_hal_async::delay::DelayNs instance */;
//!
//! let mut dht11 = Dht11::new(pin, delay);
//!
//! // Retries with `Config::retry_cooldown_ms` between attempts until a frame checks out
//! let reading = dht11.read_retrying_async().await.unwrap();
//! println!("{:3} %RH, {} °C", reading.humidity, reading.temperature);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("At least one of \"async\" and \"blocking\" features must be enabled");

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[macro_use]
mod logging;

mod decoder;
#[cfg(feature = "blocking")]
mod device_impl;
#[cfg(feature = "async")]
mod device_impl_async;
mod framer;
mod hw_def;
mod sampler;
#[cfg(test)]
mod sim;
mod types;

pub use crate::{
    decoder::{Threshold, decode, decode_frame, pack},
    framer::{FramerState, PulseFramer, frame},
    hw_def::*,
    sampler::{LevelSource, PinSource, Replay, Sampler},
    types::*,
};

use core::fmt;

#[cfg(feature = "defmt")]
use defmt::Format;

/// DHT11 device driver
#[derive(Debug)]
pub struct Dht11<Pin, Delay> {
    pub(crate) pin: Pin,
    pub(crate) delay: Delay,
    pub(crate) config: Config,
    pub(crate) mode: LineMode,
}

impl<Pin, Delay> Dht11<Pin, Delay> {
    /// Create a new DHT11 driver instance with the datasheet timing
    pub fn new(pin: Pin, delay: Delay) -> Self {
        Self::with_config(pin, delay, Config::default())
    }

    /// Create a new DHT11 driver instance
    pub fn with_config(pin: Pin, delay: Delay, config: Config) -> Self {
        Self { pin, delay, config, mode: LineMode::Input }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direction the data line was last switched to
    pub fn line_mode(&self) -> LineMode {
        self.mode
    }

    /// Destroy the driver and return the pin and delay
    pub fn release(self) -> (Pin, Delay) {
        (self.pin, self.delay)
    }
}

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Eq, PartialEq)]
pub enum Error<E> {
    /// GPIO error; retrying will not help
    Pin(E),
    /// The line went idle, or never did, without carrying a transmission
    CaptureTimeout,
    /// The capture did not contain exactly 40 data pulses
    Framing {
        /// data pulses found
        pulses: usize,
    },
    /// The checksum byte does not match the payload
    ChecksumMismatch {
        /// sum of the four payload bytes
        expected: u8,
        /// checksum byte received
        received: u8,
    },
}
impl<E> Error<E> {
    /// Whether another read cycle may succeed
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Pin(_))
    }
}
impl<E> From<DecodeError> for Error<E> {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Framing { pulses } => Error::Framing { pulses },
            DecodeError::ChecksumMismatch { expected, received } => Error::ChecksumMismatch { expected, received },
        }
    }
}
impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pin(e) => write!(f, "pin error: {e:?}"),
            Error::CaptureTimeout => write!(f, "no response from sensor"),
            Error::Framing { pulses } => write!(f, "expected 40 data pulses, got {pulses}"),
            Error::ChecksumMismatch { expected, received } => {
                write!(f, "checksum mismatch: expected 0x{expected:02X}, received 0x{received:02X}")
            }
        }
    }
}

/// Errors from decoding captured samples, independent of any pin
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The samples did not contain exactly 40 data pulses
    Framing {
        /// data pulses found
        pulses: usize,
    },
    /// The checksum byte does not match the payload
    ChecksumMismatch {
        /// sum of the four payload bytes
        expected: u8,
        /// checksum byte received
        received: u8,
    },
}
