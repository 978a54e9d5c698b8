//! Line levels, frames and readings.

use crate::DecodeError;
use crate::hw_def::*;

use core::fmt;

#[cfg(feature = "defmt")]
use defmt::Format;

/// Logic level of the data line at one sample
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    /// line pulled to ground
    Low,
    /// line released to the pull-up (or driven high)
    High,
}
impl From<bool> for Level {
    fn from(is_high: bool) -> Self {
        if is_high { Level::High } else { Level::Low }
    }
}

/// Direction the driver currently uses the data line in
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineMode {
    /// released; the sensor (or the pull-up) sets the level
    Input,
    /// driven by the host for the start condition
    Output,
}

/// Counters gathered while polling the line
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CaptureStats {
    /// samples read from the line
    pub samples: u32,
    /// level changes seen between consecutive samples
    pub transitions: u32,
}

/// One checksum-validated transmission
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Frame([u8; FRAME_LEN]);
impl Frame {
    /// Accept `bytes` if the last byte is the sum of the first four, modulo 256
    pub fn validate(bytes: [u8; FRAME_LEN]) -> Result<Self, DecodeError> {
        let expected = checksum(&bytes);
        let received = bytes[CHECKSUM];
        if expected != received {
            return Err(DecodeError::ChecksumMismatch { expected, received });
        }
        Ok(Self(bytes))
    }
    /// Integral part of the relative humidity
    pub fn humidity_integral(&self) -> u8 {
        self.0[HUMIDITY_INTEGRAL]
    }
    /// Fractional humidity byte, not part of a [`Reading`]
    pub fn humidity_fraction(&self) -> u8 {
        self.0[HUMIDITY_FRACTION]
    }
    /// Integral part of the temperature
    pub fn temperature_integral(&self) -> u8 {
        self.0[TEMPERATURE_INTEGRAL]
    }
    /// Fractional temperature byte, not part of a [`Reading`]
    pub fn temperature_fraction(&self) -> u8 {
        self.0[TEMPERATURE_FRACTION]
    }
    /// Checksum byte as transmitted
    pub fn checksum(&self) -> u8 {
        self.0[CHECKSUM]
    }
    /// All five bytes in transmission order
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

/// Sum of the four payload bytes, modulo 256
pub fn checksum(bytes: &[u8; FRAME_LEN]) -> u8 {
    bytes[..CHECKSUM].iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

/// Humidity and temperature from one accepted [`Frame`].
///
/// Only the integral bytes are carried. The DHT11 sends zero in both fractional bytes; they
/// remain available on the [`Frame`].
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reading {
    /// relative humidity in percent
    pub humidity: u8,
    /// degrees centigrade
    pub temperature: u8,
}
impl Reading {
    /// Get temperature in Fahrenheit
    pub fn fahrenheit(&self) -> f32 {
        self.temperature as f32 * 9.0 / 5.0 + 32.0
    }
}
impl From<Frame> for Reading {
    fn from(frame: Frame) -> Self {
        Self {
            humidity: frame.humidity_integral(),
            temperature: frame.temperature_integral(),
        }
    }
}
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Humidity: {}%, Temperature: {} C", self.humidity, self.temperature)
    }
}
