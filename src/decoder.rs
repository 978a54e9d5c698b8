//! Pulse widths to bytes, and bytes to a checked [`Frame`].

use crate::DecodeError;
use crate::hw_def::{FRAME_LEN, PULSE_COUNT};
use crate::types::{Frame, Reading};

/// Bit decision boundary calibrated from one capture's own pulse widths.
///
/// A pulse is a `1` when it is longer than the midpoint between the shortest and the longest
/// pulse of the capture, so no absolute timing constant is involved and the result does not
/// depend on how fast the line was polled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Threshold {
    shortest: u32,
    longest: u32,
}
impl Threshold {
    /// Calibrate from `pulses`, `None` if there are none
    pub fn calibrate(pulses: &[u32]) -> Option<Self> {
        let shortest = *pulses.iter().min()?;
        let longest = *pulses.iter().max()?;
        Some(Self { shortest, longest })
    }

    /// Calibrate from the full set of pulses of one transmission
    pub fn of_frame(pulses: &[u32; PULSE_COUNT]) -> Self {
        let (shortest, longest) = pulses
            .iter()
            .fold((u32::MAX, u32::MIN), |(lo, hi), width| (lo.min(*width), hi.max(*width)));
        Self { shortest, longest }
    }

    /// Whether a pulse of `width` samples encodes a `1`
    pub fn is_one(&self, width: u32) -> bool {
        // width > (shortest + longest) / 2, without losing the half
        2 * u64::from(width) > u64::from(self.shortest) + u64::from(self.longest)
    }
}

/// Pack 40 pulse widths into 5 bytes, most significant bit first
pub fn pack(pulses: &[u32; PULSE_COUNT], threshold: Threshold) -> [u8; FRAME_LEN] {
    let mut bytes = [0u8; FRAME_LEN];
    for (byte, widths) in bytes.iter_mut().zip(pulses.chunks_exact(8)) {
        *byte = widths
            .iter()
            .fold(0u8, |acc, width| (acc << 1) | u8::from(threshold.is_one(*width)));
    }
    bytes
}

/// Decode the pulse widths of one transmission into a checked [`Frame`]
pub fn decode_frame(pulses: &[u32]) -> Result<Frame, DecodeError> {
    let pulses: &[u32; PULSE_COUNT] = pulses
        .try_into()
        .map_err(|_| DecodeError::Framing { pulses: pulses.len() })?;
    let bytes = pack(pulses, Threshold::of_frame(pulses));
    Frame::validate(bytes).inspect_err(|_| {
        warn!("dht11::decode_frame(): checksum mismatch bytes={:?}", bytes);
    })
}

/// Decode the pulse widths of one transmission into a [`Reading`]
pub fn decode(pulses: &[u32]) -> Result<Reading, DecodeError> {
    decode_frame(pulses).map(Reading::from)
}
