use crate::framer::PulseFramer;
use crate::types::*;
use crate::{Dht11, Error, decoder};

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;

// Only the start pulse and the retry cooldown are awaited. Once the line is released the capture
// is a blocking busy loop; the released-high run before the sensor answers is absorbed by the
// framer, so no release delay is inserted there.
impl<Pin, Delay, E> Dht11<Pin, Delay>
where
    Pin: InputPin<Error = E> + OutputPin<Error = E>,
    Delay: DelayNs,
{
    /// Run one read cycle and return the humidity and temperature
    pub async fn read_async(&mut self) -> Result<Reading, Error<E>> {
        self.read_frame_async().await.map(Reading::from)
    }

    /// Run one read cycle and return the checked frame
    pub async fn read_frame_async(&mut self) -> Result<Frame, Error<E>> {
        if self.config.settle_high_us > 0 {
            self.pin.set_high().map_err(Error::Pin)?;
            self.mode = LineMode::Output;
            self.delay.delay_us(self.config.settle_high_us).await;
        }
        self.pin.set_low().map_err(Error::Pin)?;
        self.mode = LineMode::Output;
        self.delay.delay_us(self.config.start_low_us).await;

        let mut framer = PulseFramer::new();
        let stats = critical_section::with(|_cs| {
            self.pin.set_high().map_err(Error::Pin)?;
            self.listen(&mut framer)
        })?;
        trace!("dht11::read_frame_async(): {} samples, {} pulses", stats.samples, framer.pulse_count());

        let pulses = framer.finish()?;
        Ok(decoder::decode_frame(&pulses)?)
    }

    /// Read until a cycle succeeds, awaiting [`Config::retry_cooldown_ms`](crate::Config) after
    /// each failed one. Only a pin error ends the loop early.
    pub async fn read_retrying_async(&mut self) -> Result<Reading, Error<E>> {
        loop {
            match self.read_async().await {
                Ok(reading) => return Ok(reading),
                Err(e) if e.is_recoverable() => {
                    warn!("dht11::read_retrying_async(): cycle failed, retrying in {} ms", self.config.retry_cooldown_ms);
                    self.delay.delay_ms(self.config.retry_cooldown_ms).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
