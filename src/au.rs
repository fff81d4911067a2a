/*! Audio sink and source for the Au file format.

The format is very simple, and is documented on
<https://en.wikipedia.org/wiki/Au_file_format>.

The benefit .au has over .wav is that .au can be written as a stream,
without seeking back to the file header to update data sizes, which is
exactly what a modem rendering chunk by chunk wants.

Only mono 16 bit linear PCM is handled here.
*/
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::audio::{AudioSink, AudioSource};
use crate::{Error, Float, Result};

const MAGIC: u32 = 0x2e73_6e64;
const HEADER_LEN: u32 = 28;
const SIZE_UNKNOWN: u32 = 0xffff_ffff;

/// Au supports several encodings. This code handles only one.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Encoding {
    /// 16 bit linear PCM.
    Pcm16 = 3,
}

/// Streaming `.au` file writer.
pub struct AuFileSink {
    w: BufWriter<File>,
    sample_rate: u32,
}

impl AuFileSink {
    /// Create the file and write the header.
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let mut w = BufWriter::new(File::create(path)?);

        // Magic.
        w.write_all(&MAGIC.to_be_bytes())?;

        // Data offset.
        w.write_all(&HEADER_LEN.to_be_bytes())?;

        // Size, or all ones if unknown.
        w.write_all(&SIZE_UNKNOWN.to_be_bytes())?;

        // Mode.
        w.write_all(&(Encoding::Pcm16 as u32).to_be_bytes())?;

        // Sample rate.
        w.write_all(&sample_rate.to_be_bytes())?;

        // Channels.
        w.write_all(&1u32.to_be_bytes())?;

        // Minimum annotation field.
        w.write_all(&[0, 0, 0, 0])?;

        Ok(Self { w, sample_rate })
    }
}

impl AudioSink for AuFileSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[Float]) -> Result<usize> {
        let scale = Float::from(i16::MAX);
        let mut buf = Vec::with_capacity(samples.len() * 2);
        for &s in samples {
            buf.extend_from_slice(&((s * scale) as i16).to_be_bytes());
        }
        self.w.write_all(&buf)?;
        Ok(samples.len())
    }

    fn close(&mut self) -> Result<()> {
        self.w.flush()?;
        Ok(())
    }
}

/// `.au` file reader.
pub struct AuFileSource {
    r: BufReader<File>,
    sample_rate: u32,
}

impl AuFileSource {
    /// Open the file and check the header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut r = BufReader::new(File::open(path)?);

        let mut header = [0u8; 24];
        r.read_exact(&mut header)?;
        let field = |i: usize| u32::from_be_bytes(header[i * 4..i * 4 + 4].try_into().unwrap());

        if field(0) != MAGIC {
            return Err(Error::new("not an .au file"));
        }
        let data_offset = field(1);
        if data_offset < 24 {
            return Err(Error::new("bad .au data offset"));
        }
        if field(3) != Encoding::Pcm16 as u32 {
            return Err(Error::new("only 16 bit PCM .au is supported"));
        }
        let sample_rate = field(4);
        if field(5) != 1 {
            return Err(Error::new("only mono .au is supported"));
        }

        // Skip the annotation up to the data.
        let mut skip = vec![0u8; data_offset as usize - 24];
        r.read_exact(&mut skip)?;

        Ok(Self { r, sample_rate })
    }

    /// Sample rate from the file header.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioSource for AuFileSource {
    fn read(&mut self, buf: &mut [Float]) -> Result<usize> {
        let mut raw = vec![0u8; buf.len() * 2];
        let mut filled = 0;
        while filled < raw.len() {
            let n = self.r.read(&mut raw[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        let samples = filled / 2;
        for i in 0..samples {
            let v = i16::from_be_bytes([raw[2 * i], raw[2 * i + 1]]);
            buf[i] = Float::from(v) / Float::from(i16::MAX);
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.au");

        let samples: Vec<Float> = (0..1000)
            .map(|i| (std::f64::consts::TAU * 440.0 * i as Float / 48000.0).sin() * 0.5)
            .collect();

        let mut sink = AuFileSink::create(&path, 48000)?;
        assert_eq!(sink.write(&samples)?, samples.len());
        sink.close()?;

        let mut source = AuFileSource::open(&path)?;
        assert_eq!(source.sample_rate(), 48000);
        let mut back = vec![0.0; 1200];
        let n = source.read(&mut back)?;
        assert_eq!(n, 1000);
        assert_eq!(source.read(&mut back)?, 0);

        crate::tests::assert_almost_equal_float(&samples, &back[..n]);
        Ok(())
    }

    #[test]
    fn reject_garbage() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("garbage.au");
        std::fs::write(&path, b"RIFFxxxxWAVEfmt and then some")?;
        assert!(AuFileSource::open(&path).is_err());
        Ok(())
    }
}
