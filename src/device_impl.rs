use crate::framer::PulseFramer;
use crate::types::*;
use crate::{Dht11, Error, decoder};

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

impl<Pin, Delay, E> Dht11<Pin, Delay>
where
    Pin: InputPin<Error = E> + OutputPin<Error = E>,
    Delay: DelayNs,
{
    /// Run one read cycle and return the humidity and temperature
    pub fn read(&mut self) -> Result<Reading, Error<E>> {
        self.read_frame().map(Reading::from)
    }

    /// Run one read cycle and return the checked frame
    pub fn read_frame(&mut self) -> Result<Frame, Error<E>> {
        let mut framer = PulseFramer::new();

        // Preemption while polling stretches pulses, so keep the whole exchange uninterrupted.
        let stats = critical_section::with(|_cs| {
            self.start_signal()?;
            self.listen(&mut framer)
        })?;
        trace!("dht11::read_frame(): {} samples, {} pulses", stats.samples, framer.pulse_count());

        let pulses = framer.finish()?;
        Ok(decoder::decode_frame(&pulses)?)
    }

    /// Read until a cycle succeeds, pausing [`Config::retry_cooldown_ms`](crate::Config) after
    /// each failed one. Only a pin error ends the loop early.
    pub fn read_retrying(&mut self) -> Result<Reading, Error<E>> {
        loop {
            match self.read() {
                Ok(reading) => return Ok(reading),
                Err(e) if e.is_recoverable() => {
                    warn!("dht11::read_retrying(): cycle failed, retrying in {} ms", self.config.retry_cooldown_ms);
                    self.delay.delay_ms(self.config.retry_cooldown_ms);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn start_signal(&mut self) -> Result<(), Error<E>> {
        if self.config.settle_high_us > 0 {
            self.pin.set_high().map_err(Error::Pin)?;
            self.mode = LineMode::Output;
            self.delay.delay_us(self.config.settle_high_us);
        }
        self.pin.set_low().map_err(Error::Pin)?;
        self.mode = LineMode::Output;
        self.delay.delay_us(self.config.start_low_us);
        self.pin.set_high().map_err(Error::Pin)?;
        self.delay.delay_us(self.config.release_high_us);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::{LineEvent, SimDelay, SimLine, waveform};
    use crate::*;

    const SAMPLE: [u8; 5] = [0x32, 0x00, 0x15, 0x00, 0x47];

    #[test]
    fn reads_a_transmission() {
        let line = SimLine::new([waveform(SAMPLE, 26, 70)]);
        let mut dht11 = Dht11::new(line, SimDelay::default());
        assert_eq!(dht11.read().unwrap(), Reading { humidity: 50, temperature: 21 });
        assert_eq!(dht11.line_mode(), LineMode::Input);

        let (line, delay) = dht11.release();
        assert_eq!(
            line.events()[..2],
            [LineEvent::DriveLow, LineEvent::Release]
        );
        assert_eq!(delay.elapsed_us(), 18_000 + 20);
    }

    #[test]
    fn conservative_start_settles_high_first() {
        let line = SimLine::new([waveform(SAMPLE, 26, 70)]);
        let mut dht11 = Dht11::with_config(line, SimDelay::default(), Config::conservative());
        dht11.read().unwrap();
        let (line, delay) = dht11.release();
        assert_eq!(
            line.events()[..3],
            [LineEvent::Release, LineEvent::DriveLow, LineEvent::Release]
        );
        assert_eq!(delay.elapsed_us(), 50_000 + 20_000 + 20);
    }

    #[test]
    fn frame_keeps_fractions() {
        let line = SimLine::new([waveform([25, 200, 20, 200, 189], 20, 60)]);
        let mut dht11 = Dht11::new(line, SimDelay::default());
        let frame = dht11.read_frame().unwrap();
        assert_eq!((frame.humidity_fraction(), frame.temperature_fraction()), (200, 200));
        assert_eq!(Reading::from(frame), Reading { humidity: 25, temperature: 20 });
    }

    #[test]
    fn absent_sensor_times_out() {
        let line = SimLine::new([vec![]]);
        let mut dht11 = Dht11::new(line, SimDelay::default());
        assert_eq!(dht11.read(), Err(Error::CaptureTimeout));
        let (line, _) = dht11.release();
        // first idle sample, then the threshold of repeats
        assert_eq!(line.samples_read(), 101);
    }

    #[test]
    fn corrupted_transmission_is_rejected() {
        let line = SimLine::new([waveform([0x32, 0x00, 0x15, 0x00, 0x48], 26, 70)]);
        let mut dht11 = Dht11::new(line, SimDelay::default());
        assert_eq!(dht11.read(), Err(Error::ChecksumMismatch { expected: 0x47, received: 0x48 }));
    }

    #[test]
    fn retries_until_a_frame_checks_out() {
        let mut truncated = waveform(SAMPLE, 26, 70);
        truncated.truncate(1_000);
        let line = SimLine::new([
            vec![],
            truncated,
            waveform([0x32, 0x00, 0x15, 0x00, 0x00], 26, 70),
            waveform([0x28, 0x00, 0x17, 0x00, 0x3F], 30, 80),
        ]);
        let mut dht11 = Dht11::new(line, SimDelay::default());
        assert_eq!(dht11.read_retrying().unwrap(), Reading { humidity: 40, temperature: 23 });

        let (line, delay) = dht11.release();
        assert_eq!(line.cycles(), 4);
        assert_eq!(delay.elapsed_us(), 4 * (18_000 + 20) + 3 * 500_000);
    }

    #[test]
    fn pin_failure_is_fatal() {
        let line = SimLine::new([waveform(SAMPLE, 26, 70)]).failing();
        let mut dht11 = Dht11::new(line, SimDelay::default());
        assert!(matches!(dht11.read_retrying(), Err(Error::Pin(_))));
        // the line was never driven
        assert_eq!(dht11.line_mode(), LineMode::Input);
        let (_, delay) = dht11.release();
        assert_eq!(delay.elapsed_us(), 0);
    }
}
