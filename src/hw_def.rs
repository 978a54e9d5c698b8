//! DHT11 line protocol constants and driver configuration

#[cfg(feature = "defmt")]
use defmt::Format;

/// Number of data bits (high pulses) in one transmission
pub const PULSE_COUNT: usize = 40;

/// Number of bytes in one transmission, checksum included
pub const FRAME_LEN: usize = 5;

/// Start pulse: the host holds the line low for this long to wake the sensor
pub const START_LOW_US: u32 = 18_000;

/// Release: the host drives the line high for this long before listening
pub const RELEASE_HIGH_US: u32 = 20;

/// Consecutive identical samples that mark the end of a transmission
pub const IDLE_THRESHOLD: u16 = 100;

/// Upper bound on samples taken in one capture
pub const MAX_SAMPLES: u32 = 500_000;

/// Pause between failed cycles when retrying
pub const RETRY_COOLDOWN_MS: u32 = 500;

// The byte order of a transmission.
pub(crate) const HUMIDITY_INTEGRAL: usize = 0;
pub(crate) const HUMIDITY_FRACTION: usize = 1;
pub(crate) const TEMPERATURE_INTEGRAL: usize = 2;
pub(crate) const TEMPERATURE_FRACTION: usize = 3;
pub(crate) const CHECKSUM: usize = 4;

/// Timing and retry configuration of a [`Dht11`](crate::Dht11) driver.
///
/// Sampling speed is platform dependent, so the end of a transmission is detected by counting
/// unchanged samples (`idle_threshold`) rather than by elapsed time.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Time the line is driven high before the start pulse, 0 to skip
    pub settle_high_us: u32,
    /// Duration of the low start pulse
    pub start_low_us: u32,
    /// Duration the line is driven high after the start pulse, before switching to input
    pub release_high_us: u32,
    /// Unchanged samples after which the line is considered idle
    pub idle_threshold: u16,
    /// Samples after which a capture is abandoned even if the line never went idle
    pub max_samples: u32,
    /// Delay between failed cycles in the retrying reads
    pub retry_cooldown_ms: u32,
}

impl Config {
    /// Datasheet start sequence: 18 ms low, 20 µs high, then listen
    pub const fn dht11() -> Self {
        Self {
            settle_high_us: 0,
            start_low_us: START_LOW_US,
            release_high_us: RELEASE_HIGH_US,
            idle_threshold: IDLE_THRESHOLD,
            max_samples: MAX_SAMPLES,
            retry_cooldown_ms: RETRY_COOLDOWN_MS,
        }
    }

    /// Slower start sequence: 50 ms high so the line settles, then 20 ms low
    pub const fn conservative() -> Self {
        Self {
            settle_high_us: 50_000,
            start_low_us: 20_000,
            ..Self::dht11()
        }
    }

    /// Replace the settle time before the start pulse, 0 to skip it
    pub const fn with_settle_high_us(self, settle_high_us: u32) -> Self {
        Self { settle_high_us, ..self }
    }

    /// Replace the release time after the start pulse
    pub const fn with_release_high_us(self, release_high_us: u32) -> Self {
        Self { release_high_us, ..self }
    }

    /// Replace the idle threshold
    pub const fn with_idle_threshold(self, idle_threshold: u16) -> Self {
        Self { idle_threshold, ..self }
    }

    /// Replace the start pulse duration
    pub const fn with_start_low_us(self, start_low_us: u32) -> Self {
        Self { start_low_us, ..self }
    }

    /// Replace the sample guard
    pub const fn with_max_samples(self, max_samples: u32) -> Self {
        Self { max_samples, ..self }
    }

    /// Replace the retry cooldown
    pub const fn with_retry_cooldown_ms(self, retry_cooldown_ms: u32) -> Self {
        Self { retry_cooldown_ms, ..self }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::dht11()
    }
}
