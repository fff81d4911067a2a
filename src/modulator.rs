/*! The modulator contract.

A modulator turns a stream of hard bits into audio, one sample per
call. The transmit loop holds each bit for exactly
[`samples_per_bit`](Modulator::samples_per_bit) consecutive calls; the
modulator keeps whatever phase state it needs between calls to stay
continuous across bit boundaries.
*/
use crate::Float;

/// Sample-by-sample AFSK modulation.
///
/// Modulators are not thread safe; an instance belongs to the one
/// transmit loop driving it.
pub trait Modulator {
    /// Produce the next audio sample for `bit` (1 = mark, 0 = space).
    fn modulate(&mut self, bit: u8) -> Float;

    /// Return to the initial state.
    ///
    /// Calling this mid-transmission creates a phase discontinuity;
    /// only do so between independent transmissions.
    fn reset(&mut self);

    /// Samples emitted per bit period, `sample_rate / bitrate`.
    fn samples_per_bit(&self) -> usize;
}
