/*! True continuous-phase FSK modulator.

Instead of switching between two oscillators, [CPFSK][cpfsk] treats the
bitstream as an NRZ signal m(t) and transmits

```text
cos( 2π·f_center·t  −  2π·f_delta·∫m(τ)dτ )
```

The integral is what makes the phase analytically continuous: a bit
transition changes the slope of the phase, never its value. The
integral is accumulated by the trapezoidal rule over the NRZ sample
history.

Note the NRZ polarity: bit 1 maps to −1 and bit 0 to +1, which
together with `f_delta = (f_mark − f_space) / 2` puts mark on bit 1.

[cpfsk]: https://en.wikipedia.org/wiki/Continuous_phase_modulation
*/
use std::f64::consts::TAU;

use crate::modulator::Modulator;
use crate::Float;

/// CPFSK modulator integrating the NRZ bitstream.
pub struct Cpfsk {
    f_center: Float,
    f_delta: Float,
    sample_rate: u32,
    samples_per_bit: usize,
    // Running trapezoidal integral of the NRZ signal.
    integral: Float,
    nrz: Vec<Float>,
    current_sample: usize,
}

impl Cpfsk {
    /// Create a new modulator.
    pub fn new(f_mark: Float, f_space: Float, bitrate: u32, sample_rate: u32) -> Self {
        Self {
            f_center: (f_mark + f_space) / 2.0,
            f_delta: (f_mark - f_space) / 2.0,
            sample_rate,
            samples_per_bit: (sample_rate / bitrate) as usize,
            integral: 0.0,
            nrz: Vec::new(),
            current_sample: 0,
        }
    }
}

impl Modulator for Cpfsk {
    fn modulate(&mut self, bit: u8) -> Float {
        let spb = self.samples_per_bit;

        // First sample of a bit period: latch the NRZ value.
        if self.current_sample % spb == 0 {
            self.nrz.push(if bit == 1 { -1.0 } else { 1.0 });
        }

        // The +2 offset keeps the first emitted sample one phase step
        // into the carrier rather than at cos(0).
        let i = (self.current_sample + 2) as Float;
        let spb_f = spb as Float;

        // ceil() maps a sample index onto the bit that covers it; the
        // clamp handles the edges of the history.
        let last = self.nrz.len() as isize - 1;
        let index = (((i / spb_f).ceil() as isize) - 1).clamp(0, last) as usize;
        let index_prev = ((((i - 1.0) / spb_f).ceil() as isize) - 1).clamp(0, last) as usize;

        self.integral += (self.nrz[index_prev] + self.nrz[index]) / 2.0;

        let sr = Float::from(self.sample_rate);
        let phase = TAU * i * (self.f_center / sr) - TAU * self.integral * (self.f_delta / sr);

        self.current_sample += 1;
        phase.cos()
    }

    fn reset(&mut self) {
        self.integral = 0.0;
        self.nrz.clear();
        self.current_sample = 0;
    }

    fn samples_per_bit(&self) -> usize {
        self.samples_per_bit
    }
}
