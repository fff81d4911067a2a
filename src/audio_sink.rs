//! Sound card output through [cpal](https://github.com/RustAudio/cpal).
use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use log::{debug, error, info, trace};

use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};

use crate::audio::AudioSink;
use crate::{Error, Float};

struct CpalOutput {
    device: cpal::Device,
    config: cpal::StreamConfig,
}

impl CpalOutput {
    fn new(sample_rate: u32) -> Result<Self> {
        for host in cpal::platform::ALL_HOSTS {
            debug!("Audio sink host: {host:?}, name: {}", host.name());
        }
        let host = cpal::default_host();
        debug!("Audio sink chose default host {}", host.id().name());

        let device = host.default_output_device().ok_or(anyhow::Error::msg(
            "audio sink: failed to find output device",
        ))?;
        info!("Audio sink output device: {}", device.name()?);

        trace!("Audio sink supported output configs:");
        for conf in device.supported_output_configs()? {
            trace!("  {conf:?}");
        }

        let config = device.default_output_config()?;
        debug!("Audio sink using default output config {config:?}");

        let mut config: cpal::StreamConfig = config.into();
        config.sample_rate = cpal::SampleRate(sample_rate);
        config.channels = 1;

        Ok(Self { device, config })
    }

    fn start(&self) -> Result<(SyncSender<f32>, cpal::Stream)> {
        // 3 seconds of buffer between the modem and the device.
        let (sender, receiver) = sync_channel::<f32>(self.config.sample_rate.0 as usize * 3);

        let channels = self.config.channels as usize;
        let err_fn = |err| error!("an error occurred on stream: {}", err);

        info!("Starting output stream {:?}", self.config);
        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    match receiver.recv() {
                        Err(e) => {
                            info!("Failed to read audio samples: {e:?}");
                        }
                        Ok(v) => {
                            let value = f32::from_sample(v);
                            for sample in frame.iter_mut() {
                                *sample = value;
                            }
                        }
                    }
                }
            },
            err_fn,
            None,
        )?;
        stream.play()?;
        Ok((sender, stream))
    }
}

/// The default sound card as an [`AudioSink`].
///
/// Samples are queued to the device callback through a bounded
/// channel. When the channel fills up, `write` reports a short (or
/// zero) write and the modem's render loop backs off, so a slow
/// device never blocks the transmit thread inside the sink.
pub struct AudioDeviceSink {
    sender: SyncSender<f32>,
    sample_rate: u32,

    // Needs to be kept around, but linter thinks it's unused.
    _stream: cpal::Stream,
}

impl AudioDeviceSink {
    /// Open the default output device at the given sample rate.
    pub fn new(sample_rate: u32) -> Result<Self> {
        let output = CpalOutput::new(sample_rate)?;
        let (sender, stream) = output.start()?;

        Ok(Self {
            sender,
            sample_rate,
            _stream: stream,
        })
    }
}

impl AudioSink for AudioDeviceSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[Float]) -> crate::Result<usize> {
        for (written, &s) in samples.iter().enumerate() {
            match self.sender.try_send(s as f32) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => return Ok(written),
                Err(TrySendError::Disconnected(_)) => {
                    return Err(Error::new("audio output stream closed"));
                }
            }
        }
        Ok(samples.len())
    }

    fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }
}
