/*! Audio stream contracts, and in-memory implementations of them.

The modem only ever talks to audio through these two traits, so a
sound card, a file, and a plain buffer all look the same to it. Short
writes are how a sink signals backpressure: a return of 0 means "try
again in a moment", not failure.
*/
use std::sync::{Arc, Mutex};

use crate::{Error, Float, Result};

/// Something that accepts audio samples: a sound card, a file, a
/// buffer.
pub trait AudioSink {
    /// Sample rate the sink runs at.
    fn sample_rate(&self) -> u32;

    /// Write samples, returning how many were accepted (0..=len).
    /// Zero means transient backpressure.
    fn write(&mut self, samples: &[Float]) -> Result<usize>;

    /// Flush and release the sink.
    fn close(&mut self) -> Result<()>;
}

/// Something that produces audio samples.
pub trait AudioSource {
    /// Read samples into `buf`, returning how many were produced.
    /// Zero means end of stream.
    fn read(&mut self, buf: &mut [Float]) -> Result<usize>;
}

/// Sink that collects samples into a shared buffer. Grab a handle to
/// the buffer before moving the sink into the modem.
pub struct VectorSink {
    sample_rate: u32,
    data: Arc<Mutex<Vec<Float>>>,
}

impl VectorSink {
    /// Create a new collecting sink.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            data: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle to the collected samples.
    pub fn buffer(&self) -> Arc<Mutex<Vec<Float>>> {
        self.data.clone()
    }
}

impl AudioSink for VectorSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[Float]) -> Result<usize> {
        self.data
            .lock()
            .map_err(|e| Error::new(&format!("poisoned buffer: {e}")))?
            .extend_from_slice(samples);
        Ok(samples.len())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Source that replays a sample buffer.
pub struct VectorSource {
    data: Vec<Float>,
    pos: usize,
}

impl VectorSource {
    /// Create a source over the given samples.
    pub fn new(data: Vec<Float>) -> Self {
        Self { data, pos: 0 }
    }
}

impl AudioSource for VectorSource {
    fn read(&mut self, buf: &mut [Float]) -> Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
