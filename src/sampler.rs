//! Polling capture of the data line.

use crate::{Dht11, Error};
use crate::framer::PulseFramer;
use crate::hw_def::Config;
use crate::types::{CaptureStats, Level, LineMode};

use core::convert::Infallible;
use embedded_hal::digital::InputPin;

/// Something the sampler can poll for line levels
pub trait LevelSource {
    /// Error returned when the level cannot be read
    type Error;

    /// Take the next sample, or `None` once the source has nothing more to give
    fn sample(&mut self) -> Result<Option<Level>, Self::Error>;
}

/// [`LevelSource`] reading a GPIO input
pub struct PinSource<'a, P>(&'a mut P);
impl<'a, P: InputPin> PinSource<'a, P> {
    /// Poll `pin`
    pub fn new(pin: &'a mut P) -> Self {
        Self(pin)
    }
}
impl<P: InputPin> LevelSource for PinSource<'_, P> {
    type Error = P::Error;

    fn sample(&mut self) -> Result<Option<Level>, Self::Error> {
        Ok(Some(Level::from(self.0.is_high()?)))
    }
}

/// [`LevelSource`] replaying a recorded or synthetic sequence of levels
pub struct Replay<I>(I);
impl<I: Iterator<Item = Level>> Replay<I> {
    /// Replay `levels` in order
    pub fn new<L: IntoIterator<IntoIter = I>>(levels: L) -> Self {
        Self(levels.into_iter())
    }
}
impl<I: Iterator<Item = Level>> LevelSource for Replay<I> {
    type Error = Infallible;

    fn sample(&mut self) -> Result<Option<Level>, Self::Error> {
        Ok(self.0.next())
    }
}

/// Polls a [`LevelSource`] until the line goes idle
#[derive(Clone, Copy, Debug)]
pub struct Sampler {
    idle_threshold: u16,
    max_samples: u32,
}
impl Sampler {
    /// Stop after `idle_threshold` unchanged samples, or after `max_samples` samples in total
    pub const fn new(idle_threshold: u16, max_samples: u32) -> Self {
        Self { idle_threshold, max_samples }
    }

    /// Sampler using the thresholds from `config`
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.idle_threshold, config.max_samples)
    }

    /// Poll `source` as fast as it answers, handing every sample to `on_sample` in order.
    ///
    /// The capture ends once `idle_threshold` consecutive samples repeat the level before them,
    /// or when the source runs dry. A capture that never saw the level change, or that reached
    /// `max_samples` without going idle, is a [`Error::CaptureTimeout`].
    pub fn capture<S, F>(&self, source: &mut S, mut on_sample: F) -> Result<CaptureStats, Error<S::Error>>
    where
        S: LevelSource,
        F: FnMut(Level),
    {
        let mut stats = CaptureStats::default();
        let mut last: Option<Level> = None;
        let mut unchanged: u16 = 0;

        while unchanged < self.idle_threshold {
            if stats.samples >= self.max_samples {
                warn!("dht11::capture(): no idle line after {} samples", stats.samples);
                return Err(Error::CaptureTimeout);
            }
            let Some(level) = source.sample().map_err(Error::Pin)? else {
                trace!("dht11::capture(): source exhausted");
                break;
            };
            on_sample(level);
            stats.samples += 1;

            match last {
                Some(previous) if previous == level => unchanged += 1,
                Some(_) => {
                    stats.transitions += 1;
                    unchanged = 0;
                    last = Some(level);
                }
                None => last = Some(level),
            }
        }

        if stats.transitions == 0 {
            debug!("dht11::capture(): line never changed in {} samples", stats.samples);
            return Err(Error::CaptureTimeout);
        }
        trace!("dht11::capture(): samples={}, transitions={}", stats.samples, stats.transitions);
        Ok(stats)
    }
}

impl<Pin, Delay, E> Dht11<Pin, Delay>
where
    Pin: InputPin<Error = E>,
{
    /// Hand the line to the sensor and stream the capture into `framer`
    pub(crate) fn listen(&mut self, framer: &mut PulseFramer) -> Result<CaptureStats, Error<E>> {
        self.mode = LineMode::Input;
        Sampler::from_config(&self.config).capture(&mut PinSource::new(&mut self.pin), |level| framer.push(level))
    }
}
