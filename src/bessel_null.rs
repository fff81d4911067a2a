/*! Calibration modulator for Bessel-null deviation measurement.

Ignores its input bits entirely: the output alternates between the
mark and space tones every bit period, blending between them at each
boundary through a precomputed raised-cosine window. Feeding this into
a transmitter gives a steady, spectrally clean square-wave FM test
signal for dialing in the modulation index at a [Bessel null][bessel].

[bessel]: https://en.wikipedia.org/wiki/Frequency_modulation#Bessel_functions
*/
use std::f64::consts::{PI, TAU};

use crate::modulator::Modulator;
use crate::Float;

/// Alternating mark/space calibration source.
pub struct BesselNull {
    f_mark: Float,
    f_space: Float,
    sample_rate: u32,
    samples_per_bit: usize,
    transition_samples: usize,
    window: Vec<Float>,
    phase: Float,
    sample_index: usize,
    use_mark: bool,
}

impl BesselNull {
    /// Create a new calibration modulator. `alpha` is the fraction of
    /// the bit period spent blending between tones.
    pub fn new(f_mark: Float, f_space: Float, bitrate: u32, sample_rate: u32, alpha: Float) -> Self {
        let samples_per_bit = (sample_rate / bitrate) as usize;
        let transition_samples = ((alpha * samples_per_bit as Float) as usize).max(1);

        let window = if transition_samples > 1 {
            (0..transition_samples)
                .map(|i| {
                    let x = i as Float / (transition_samples - 1) as Float;
                    0.5 * (1.0 - (PI * x).cos())
                })
                .collect()
        } else {
            vec![1.0]
        };

        Self {
            f_mark,
            f_space,
            sample_rate,
            samples_per_bit,
            transition_samples,
            window,
            phase: 0.0,
            sample_index: 0,
            use_mark: true,
        }
    }
}

impl Modulator for BesselNull {
    fn modulate(&mut self, _bit: u8) -> Float {
        let target = if self.use_mark { self.f_mark } else { self.f_space };

        let freq = if self.sample_index < self.transition_samples {
            let prev = if self.use_mark { self.f_space } else { self.f_mark };
            prev + (target - prev) * self.window[self.sample_index]
        } else {
            target
        };

        let output = self.phase.sin();
        self.phase = (self.phase + TAU * freq / Float::from(self.sample_rate)) % TAU;

        self.sample_index += 1;
        if self.sample_index >= self.samples_per_bit {
            self.sample_index = 0;
            self.use_mark = !self.use_mark;
        }

        output
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.sample_index = 0;
        self.use_mark = true;
    }

    fn samples_per_bit(&self) -> usize {
        self.samples_per_bit
    }
}
