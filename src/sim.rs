//! Simulated open-drain line and delay for tests.

use crate::hw_def::{FRAME_LEN, PULSE_COUNT};
use crate::types::Level;

use std::collections::VecDeque;

/// What the host did to the line
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineEvent {
    DriveLow,
    Release,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SimError;
impl embedded_hal::digital::Error for SimError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Line with a sensor that plays one scripted transmission per start pulse, then idles high
#[derive(Debug, Default)]
pub struct SimLine {
    scripts: VecDeque<Vec<Level>>,
    current: Vec<Level>,
    cursor: usize,
    events: Vec<LineEvent>,
    samples_read: usize,
    cycles: usize,
    failing: bool,
}
impl SimLine {
    pub fn new<I: IntoIterator<Item = Vec<Level>>>(scripts: I) -> Self {
        Self { scripts: scripts.into_iter().collect(), ..Self::default() }
    }

    /// Every pin operation fails
    pub fn failing(self) -> Self {
        Self { failing: true, ..self }
    }

    pub fn events(&self) -> &[LineEvent] {
        &self.events
    }

    pub fn samples_read(&self) -> usize {
        self.samples_read
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    fn check(&self) -> Result<(), SimError> {
        if self.failing { Err(SimError) } else { Ok(()) }
    }
}
impl embedded_hal::digital::ErrorType for SimLine {
    type Error = SimError;
}
impl embedded_hal::digital::OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.events.push(LineEvent::DriveLow);
        self.current = self.scripts.pop_front().unwrap_or_default();
        self.cursor = 0;
        self.cycles += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.events.push(LineEvent::Release);
        Ok(())
    }
}
impl embedded_hal::digital::InputPin for SimLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.check()?;
        let level = self.current.get(self.cursor).copied().unwrap_or(Level::High);
        self.cursor += 1;
        self.samples_read += 1;
        Ok(level == Level::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Delay that only accounts for the time it was asked to wait
#[derive(Debug, Default)]
pub struct SimDelay {
    elapsed_ns: u64,
}
impl SimDelay {
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns / 1_000
    }
}
impl embedded_hal::delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}
#[cfg(feature = "async")]
impl embedded_hal_async::delay::DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

/// The 40 data bits of `bytes`, most significant bit first
pub fn bits(bytes: [u8; FRAME_LEN]) -> impl Iterator<Item = bool> {
    bytes.into_iter().flat_map(|byte| (0..8).rev().map(move |bit| (byte >> bit) & 1 == 1))
}

/// Pulse widths encoding `bytes`, `short` samples for a `0`, `long` for a `1`
pub fn pulses(bytes: [u8; FRAME_LEN], short: u32, long: u32) -> [u32; PULSE_COUNT] {
    let mut widths = [0; PULSE_COUNT];
    for (width, bit) in widths.iter_mut().zip(bits(bytes)) {
        *width = if bit { long } else { short };
    }
    widths
}

/// Samples of a full transmission of `bytes` as seen right after the host releases the line:
/// a short released-high run, the 80/80 response, 40 bits of 50 low + `short`/`long` high,
/// and the closing 50 low. The idle line that follows is not included.
pub fn waveform(bytes: [u8; FRAME_LEN], short: usize, long: usize) -> Vec<Level> {
    let mut samples = Vec::new();
    let mut run = |level: Level, len: usize| samples.extend(std::iter::repeat_n(level, len));
    run(Level::High, 3);
    run(Level::Low, 80);
    run(Level::High, 80);
    for bit in bits(bytes) {
        run(Level::Low, 50);
        run(Level::High, if bit { long } else { short });
    }
    run(Level::Low, 50);
    samples
}
