/*! Hard-decision AFSK demodulation.

The modem consumes demodulators through the [`Demodulator`] trait and
does not care how the bits were sliced. The implementation provided
here is the simplest thing that works on a clean channel: correlate
each bit period against the mark and space tones and compare energies,
i.e. a two-bin DFT per bit. It has no clock recovery, so it expects
the sample stream to start on a bit boundary, which is exactly what
the modulate → demodulate test path produces.
*/
use num_complex::Complex;
use std::f64::consts::TAU;

use crate::Float;

/// Turns audio samples into hard-decision bits.
pub trait Demodulator {
    /// Demodulate a block of samples into bits.
    fn demodulate(&mut self, samples: &[Float]) -> Vec<u8>;
}

/// Per-bit tone correlation demodulator.
pub struct DftDemodulator {
    f_mark: Float,
    f_space: Float,
    sample_rate: u32,
    samples_per_bit: usize,
}

impl DftDemodulator {
    /// Create a new demodulator for the given tone pair and rates.
    pub fn new(f_mark: Float, f_space: Float, bitrate: u32, sample_rate: u32) -> Self {
        Self {
            f_mark,
            f_space,
            sample_rate,
            samples_per_bit: (sample_rate / bitrate) as usize,
        }
    }

    fn correlate(&self, chunk: &[Float], freq: Float) -> Float {
        let sr = Float::from(self.sample_rate);
        let mut acc = Complex::new(0.0, 0.0);
        for (i, &s) in chunk.iter().enumerate() {
            acc += s * Complex::from_polar(1.0, -TAU * freq * i as Float / sr);
        }
        acc.norm_sqr()
    }
}

impl Demodulator for DftDemodulator {
    fn demodulate(&mut self, samples: &[Float]) -> Vec<u8> {
        let spb = self.samples_per_bit;
        let mut bits = Vec::with_capacity(samples.len() / spb);
        for chunk in samples.chunks_exact(spb) {
            let mark = self.correlate(chunk, self.f_mark);
            let space = self.correlate(chunk, self.f_space);
            bits.push(u8::from(mark > space));
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dds_afsk::DdsAfsk;
    use crate::modulator::Modulator;

    fn modulate(bits: &[u8]) -> Vec<Float> {
        // Coherent AFSK1200.
        let mut modulator = DdsAfsk::new(1200.0, 2200.0, 1200, 48000, 1.0);
        let mut audio = Vec::new();
        for &bit in bits {
            for _ in 0..modulator.samples_per_bit() {
                audio.push(modulator.modulate(bit));
            }
        }
        audio
    }

    #[test]
    fn modulate_demodulate_8bits() {
        let bits = vec![0u8, 0, 1, 1, 0, 1, 0, 0];
        let audio = modulate(&bits);
        let mut demod = DftDemodulator::new(1200.0, 2200.0, 1200, 48000);
        assert_eq!(demod.demodulate(&audio), bits);
    }

    #[test]
    fn modulate_demodulate_long_pseudo_random() {
        let mut state = 0xdead_beefu64;
        let bits: Vec<u8> = (0..10_000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state & 1) as u8
            })
            .collect();
        let audio = modulate(&bits);
        let mut demod = DftDemodulator::new(1200.0, 2200.0, 1200, 48000);
        assert_eq!(demod.demodulate(&audio), bits);
    }

    #[test]
    fn trailing_partial_bit_is_dropped() {
        let bits = vec![1u8, 0, 1];
        let mut audio = modulate(&bits);
        audio.truncate(audio.len() - 15);
        let mut demod = DftDemodulator::new(1200.0, 2200.0, 1200, 48000);
        assert_eq!(demod.demodulate(&audio), vec![1, 0]);
    }
}
