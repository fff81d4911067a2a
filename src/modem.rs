/*! The modem itself: the transmit pipeline and the receive scan.

Transmit renders a whole packet to audio before returning:

1. Converter encodes the packet into the NRZI bitstream.
2. The modulator runs once per sample, `samples_per_bit` per bit.
3. Pre-emphasis (optional) and gain over the signal region.
4. Leading and trailing silence.
5. Chunked writes to the audio sink, backing off 1 ms whenever the
   sink reports backpressure.

Everything is synchronous and single threaded; the only waiting is the
cooperative backoff in step 5. Cancelling mid-transmission is the sink
owner's job (close the stream, the write fails, transmit returns).
*/
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::audio::{AudioSink, AudioSource};
use crate::converter::{BitstreamConverter, Converter};
use crate::demodulator::Demodulator;
use crate::modulator::Modulator;
use crate::packet::Packet;
use crate::{Float, Result};

// 10 ms at 48 kHz.
const RENDER_CHUNK: usize = 480;

/// Modem tuning knobs, all optional. Out-of-range values are clamped
/// by the setters.
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// AFSK bitrate, bits per second.
    pub baud_rate: u32,
    /// Preamble duration in milliseconds, rounded down to HDLC flags.
    pub tx_delay_ms: Float,
    /// Postamble duration in milliseconds.
    pub tx_tail_ms: Float,
    /// Linear output gain.
    pub gain: Float,
    /// Apply a 75 µs pre-emphasis filter before output.
    pub preemphasis: bool,
    /// Silence before the signal, seconds.
    pub start_silence_s: Float,
    /// Silence after the signal, seconds.
    pub end_silence_s: Float,
    /// Mark tone, Hz.
    pub f_mark: Float,
    /// Space tone, Hz.
    pub f_space: Float,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            baud_rate: 1200,
            tx_delay_ms: 0.0,
            tx_tail_ms: 0.0,
            gain: 1.0,
            preemphasis: false,
            start_silence_s: 0.0,
            end_silence_s: 0.0,
            f_mark: 1200.0,
            f_space: 2200.0,
        }
    }
}

impl ModemConfig {
    /// Set the bitrate. Zero falls back to 1200.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = if baud == 0 { 1200 } else { baud };
        self
    }

    /// Set the preamble duration in milliseconds.
    pub fn tx_delay(mut self, ms: Float) -> Self {
        self.tx_delay_ms = ms.max(0.0);
        self
    }

    /// Set the postamble duration in milliseconds.
    pub fn tx_tail(mut self, ms: Float) -> Self {
        self.tx_tail_ms = ms.max(0.0);
        self
    }

    /// Set the linear output gain.
    pub fn gain(mut self, gain: Float) -> Self {
        self.gain = gain;
        self
    }

    /// Enable or disable pre-emphasis.
    pub fn preemphasis(mut self, enable: bool) -> Self {
        self.preemphasis = enable;
        self
    }

    /// Set the leading silence in seconds.
    pub fn start_silence(mut self, seconds: Float) -> Self {
        self.start_silence_s = seconds.max(0.0);
        self
    }

    /// Set the trailing silence in seconds.
    pub fn end_silence(mut self, seconds: Float) -> Self {
        self.end_silence_s = seconds.max(0.0);
        self
    }

    /// Set the mark and space tones.
    pub fn tones(mut self, f_mark: Float, f_space: Float) -> Self {
        self.f_mark = f_mark;
        self.f_space = f_space;
        self
    }
}

/// An assembled modem. Construction takes every collaborator, so a
/// `Modem` is usable from the moment it exists.
pub struct Modem {
    sink: Box<dyn AudioSink>,
    modulator: Box<dyn Modulator>,
    converter: Converter,
    config: ModemConfig,
    preamble_flags: usize,
    postamble_flags: usize,
}

impl Modem {
    /// Assemble a modem from its sink, modulator and converter.
    pub fn new(
        sink: Box<dyn AudioSink>,
        modulator: Box<dyn Modulator>,
        converter: Converter,
        config: ModemConfig,
    ) -> Self {
        let ms_per_flag = 8000.0 / Float::from(config.baud_rate);
        let preamble_flags = ((config.tx_delay_ms / ms_per_flag) as usize).max(1);
        let postamble_flags = ((config.tx_tail_ms / ms_per_flag) as usize).max(1);
        debug!("preamble {preamble_flags} flags, postamble {postamble_flags} flags");

        Self {
            sink,
            modulator,
            converter,
            config,
            preamble_flags,
            postamble_flags,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// HDLC flags sent before the frame.
    pub fn preamble_flags(&self) -> usize {
        self.preamble_flags
    }

    /// HDLC flags sent after the frame.
    pub fn postamble_flags(&self) -> usize {
        self.postamble_flags
    }

    /// Encode and transmit one packet.
    pub fn transmit(&mut self, packet: &Packet) -> Result<()> {
        info!("transmitting {packet}");
        let bits = self
            .converter
            .encode(packet, self.preamble_flags, self.postamble_flags);
        self.transmit_bits(&bits)
    }

    /// Transmit an already-encoded bitstream.
    pub fn transmit_bits(&mut self, bits: &[u8]) -> Result<()> {
        let mut audio = self.modulate_bitstream(bits);
        self.postprocess_audio(&mut audio);
        self.render_audio(&audio)
    }

    /// Read the source dry, demodulate, and scan for frames.
    pub fn receive(
        &self,
        source: &mut dyn AudioSource,
        demodulator: &mut dyn Demodulator,
    ) -> Result<Vec<Packet>> {
        let mut samples = Vec::new();
        let mut chunk = vec![0.0; 4096];
        loop {
            let n = source.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            samples.extend_from_slice(&chunk[..n]);
        }
        debug!("receive: {} samples", samples.len());

        let bits = demodulator.demodulate(&samples);

        let mut packets = Vec::new();
        let mut offset = 0;
        while offset < bits.len() {
            let (packet, read) = self.converter.try_decode(&bits, offset);
            if let Some(p) = packet {
                packets.push(p);
            }
            if read == 0 {
                break;
            }
            offset += read;
        }
        info!("receive: decoded {} packets", packets.len());
        Ok(packets)
    }

    /// Close the underlying audio sink.
    pub fn close(&mut self) -> Result<()> {
        self.sink.close()
    }

    fn start_silence_samples(&self) -> usize {
        (self.config.start_silence_s * Float::from(self.sink.sample_rate())) as usize
    }

    fn modulate_bitstream(&mut self, bits: &[u8]) -> Vec<Float> {
        let spb = self.modulator.samples_per_bit();
        let silence = self.start_silence_samples();

        let mut audio = vec![0.0; silence + bits.len() * spb];
        let mut pos = silence;
        for &bit in bits {
            for _ in 0..spb {
                audio[pos] = self.modulator.modulate(bit);
                pos += 1;
            }
        }

        // The transmission is over, so the discontinuity is harmless.
        self.modulator.reset();
        audio
    }

    fn postprocess_audio(&self, audio: &mut Vec<Float>) {
        let silence = self.start_silence_samples();
        let sample_rate = self.sink.sample_rate();

        if self.config.preemphasis {
            apply_preemphasis(&mut audio[silence..], sample_rate, 75e-6);
        }
        apply_gain(&mut audio[silence..], self.config.gain);

        for s in &mut audio[..silence] {
            *s = 0.0;
        }
        let end = (self.config.end_silence_s * Float::from(sample_rate)) as usize;
        audio.extend(std::iter::repeat(0.0).take(end));
    }

    fn render_audio(&mut self, audio: &[Float]) -> Result<()> {
        let mut pos = 0;
        while pos < audio.len() {
            let end = (pos + RENDER_CHUNK).min(audio.len());
            let written = self.sink.write(&audio[pos..end])?;
            if written > 0 {
                pos += written;
            } else {
                // Sink buffer full, wait a bit.
                thread::sleep(Duration::from_millis(1));
            }
        }
        Ok(())
    }
}

/// Scale samples in place.
pub fn apply_gain(samples: &mut [Float], gain: Float) {
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

/// First-order IIR pre-emphasis (high-pass), in place.
///
/// `y[n] = x[n] - x[n-1] + α·y[n-1]` with `α = exp(-1/(rate·τ))`. The
/// state starts at the first sample, so there is no startup transient.
pub fn apply_preemphasis(samples: &mut [Float], sample_rate: u32, tau: Float) {
    if samples.is_empty() {
        return;
    }
    let alpha = (-1.0 / (Float::from(sample_rate) * tau)).exp();

    let mut x_prev = samples[0];
    let mut y_prev = samples[0];
    for s in &mut samples[1..] {
        let x = *s;
        let y = x - x_prev + alpha * y_prev;
        x_prev = x;
        y_prev = y;
        *s = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::VectorSink;
    use crate::dds_afsk::DdsAfsk;

    fn test_modem(config: ModemConfig) -> (Modem, std::sync::Arc<std::sync::Mutex<Vec<Float>>>) {
        let sink = VectorSink::new(48000);
        let buffer = sink.buffer();
        let modulator = DdsAfsk::new(config.f_mark, config.f_space, config.baud_rate, 48000, 0.3);
        let modem = Modem::new(
            Box::new(sink),
            Box::new(modulator),
            Converter::basic(),
            config,
        );
        (modem, buffer)
    }

    #[test]
    fn config_clamps() {
        let config = ModemConfig::default()
            .baud_rate(0)
            .tx_delay(-5.0)
            .tx_tail(-1.0)
            .start_silence(-2.0)
            .end_silence(-2.0);
        assert_eq!(config.baud_rate, 1200);
        assert_eq!(config.tx_delay_ms, 0.0);
        assert_eq!(config.tx_tail_ms, 0.0);
        assert_eq!(config.start_silence_s, 0.0);
        assert_eq!(config.end_silence_s, 0.0);
    }

    #[test]
    fn flag_counts_from_timing() {
        // 1200 baud: one flag is 8000/1200 = 6.67 ms.
        let (modem, _) = test_modem(ModemConfig::default().tx_delay(300.0).tx_tail(45.0));
        assert_eq!(modem.preamble_flags(), 45);
        assert_eq!(modem.postamble_flags(), 6);

        // Both are at least one flag, or nothing would delimit the
        // frame.
        let (modem, _) = test_modem(ModemConfig::default());
        assert_eq!(modem.preamble_flags(), 1);
        assert_eq!(modem.postamble_flags(), 1);
    }

    #[test]
    fn transmit_renders_expected_sample_count() {
        let (mut modem, buffer) = test_modem(
            ModemConfig::default()
                .start_silence(0.1)
                .end_silence(0.05)
                .gain(0.5),
        );
        let packet = Packet {
            from: "N0CALL-10".into(),
            to: "APZ001".into(),
            path: vec!["WIDE1-1".into(), "WIDE2-2".into()],
            data: b"Hello, APRS!".to_vec(),
        };
        modem.transmit(&packet).unwrap();

        let audio = buffer.lock().unwrap();
        // 368 bits at 40 samples each, plus 0.1 s + 0.05 s of silence.
        assert_eq!(audio.len(), 4800 + 368 * 40 + 2400);
        assert!(audio[..4800].iter().all(|&s| s == 0.0));
        assert!(audio[audio.len() - 2400..].iter().all(|&s| s == 0.0));
        // Gain applies to the signal region.
        let peak = audio[4800..audio.len() - 2400]
            .iter()
            .fold(0.0f64, |m, &s| m.max(s.abs()));
        assert!(peak <= 0.5 + 1e-9);
        assert!(peak > 0.4);
    }

    #[test]
    fn gain_scales() {
        let mut samples = vec![1.0, -0.5, 0.25];
        apply_gain(&mut samples, 0.5);
        assert_eq!(samples, vec![0.5, -0.25, 0.125]);
    }

    #[test]
    fn preemphasis_blocks_dc() {
        // Constant input decays to zero: the filter has a zero at DC.
        let mut samples = vec![1.0; 2000];
        apply_preemphasis(&mut samples, 48000, 75e-6);
        assert_eq!(samples[0], 1.0);
        assert!(samples[1999].abs() < 1e-12);
    }

    #[test]
    fn preemphasis_boosts_high_frequencies() {
        let tone = |freq: Float| -> Float {
            let mut samples: Vec<Float> = (0..4800)
                .map(|i| (std::f64::consts::TAU * freq * i as Float / 48000.0).sin())
                .collect();
            apply_preemphasis(&mut samples, 48000, 75e-6);
            // Steady-state RMS, skipping the settling region.
            let tail = &samples[2400..];
            (tail.iter().map(|s| s * s).sum::<Float>() / tail.len() as Float).sqrt()
        };
        assert!(tone(2200.0) > tone(1200.0) * 1.3);
    }
}
