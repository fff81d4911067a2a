//! Transmit one APRS packet as AFSK audio.
//!
//! Renders to an `.au` file, or with the `audio` feature straight to
//! the default sound card:
//!
//! ```text
//! aprstx --from N0CALL-10 --message ">On the air" -o packet.au
//! aprstx --from N0CALL-10 --modulator cpfsk --fx25 -o packet.au
//! ```
use anyhow::Result;
use clap::Parser;
use log::info;

use aprsmodem::au::AuFileSink;
use aprsmodem::audio::AudioSink;
use aprsmodem::bessel_null::BesselNull;
use aprsmodem::converter::Converter;
use aprsmodem::cpfsk::Cpfsk;
use aprsmodem::dds_afsk::DdsAfsk;
use aprsmodem::dds_afsk_fast::DdsAfskFast;
use aprsmodem::modem::{Modem, ModemConfig};
use aprsmodem::modulator::Modulator;
use aprsmodem::packet::Packet;
use aprsmodem::Float;

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Opt {
    /// Verbosity level.
    #[arg(short, default_value_t = 2)]
    verbose: usize,

    /// Source callsign.
    #[arg(long)]
    from: String,

    /// Destination callsign.
    #[arg(long, default_value = "APZ001")]
    to: String,

    /// Digipeater path.
    #[arg(long, default_value = "WIDE1-1,WIDE2-2", use_value_delimiter = true)]
    path: Vec<String>,

    /// Payload text.
    #[arg(long, default_value = ">aprsmodem test transmission")]
    message: String,

    /// AFSK bitrate.
    #[arg(long, default_value_t = 1200)]
    baud: u32,

    /// Preamble duration in milliseconds.
    #[arg(long, default_value_t = 300.0)]
    tx_delay: Float,

    /// Postamble duration in milliseconds.
    #[arg(long, default_value_t = 45.0)]
    tx_tail: Float,

    /// Linear output gain.
    #[arg(long, default_value_t = 0.5)]
    gain: Float,

    /// Apply 75 microsecond pre-emphasis.
    #[arg(long)]
    preemphasis: bool,

    /// Leading silence in seconds.
    #[arg(long, default_value_t = 0.1)]
    start_silence: Float,

    /// Trailing silence in seconds.
    #[arg(long, default_value_t = 0.1)]
    end_silence: Float,

    /// Mark tone in Hz.
    #[arg(long, default_value_t = 1200.0)]
    f_mark: Float,

    /// Space tone in Hz.
    #[arg(long, default_value_t = 2200.0)]
    f_space: Float,

    /// Audio sample rate.
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Modulator: dds, fast, cpfsk, or bessel (calibration tone).
    #[arg(long, default_value = "dds")]
    modulator: String,

    /// Frequency smoothing factor for the dds modulator.
    #[arg(long, default_value_t = 0.3)]
    alpha: Float,

    /// Wrap the frame in an FX.25 Reed-Solomon envelope.
    #[arg(long)]
    fx25: bool,

    /// Output .au file. Omit to play on the default output device.
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    stderrlog::new()
        .module(module_path!())
        .module("aprsmodem")
        .verbosity(opt.verbose)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let packet = Packet {
        from: opt.from.clone(),
        to: opt.to.clone(),
        path: opt.path.clone(),
        data: opt.message.clone().into_bytes(),
    };

    let sink: Box<dyn AudioSink> = match &opt.output {
        Some(path) => Box::new(AuFileSink::create(path, opt.sample_rate)?),
        None => {
            #[cfg(feature = "audio")]
            {
                Box::new(aprsmodem::audio_sink::AudioDeviceSink::new(opt.sample_rate)?)
            }
            #[cfg(not(feature = "audio"))]
            {
                anyhow::bail!("built without the audio feature; use --output FILE");
            }
        }
    };

    let modulator: Box<dyn Modulator> = match opt.modulator.as_str() {
        "dds" => Box::new(DdsAfsk::new(
            opt.f_mark,
            opt.f_space,
            opt.baud,
            opt.sample_rate,
            opt.alpha,
        )),
        "fast" => Box::new(DdsAfskFast::<Float>::new(
            opt.f_mark,
            opt.f_space,
            opt.baud,
            opt.sample_rate,
        )),
        "cpfsk" => Box::new(Cpfsk::new(opt.f_mark, opt.f_space, opt.baud, opt.sample_rate)),
        "bessel" => Box::new(BesselNull::new(
            opt.f_mark,
            opt.f_space,
            opt.baud,
            opt.sample_rate,
            0.08,
        )),
        other => anyhow::bail!("unknown modulator {other:?}, expected dds, fast, cpfsk or bessel"),
    };

    let converter = if opt.fx25 {
        Converter::fx25()
    } else {
        Converter::basic()
    };

    let config = ModemConfig::default()
        .baud_rate(opt.baud)
        .tx_delay(opt.tx_delay)
        .tx_tail(opt.tx_tail)
        .gain(opt.gain)
        .preemphasis(opt.preemphasis)
        .start_silence(opt.start_silence)
        .end_silence(opt.end_silence)
        .tones(opt.f_mark, opt.f_space);

    let mut modem = Modem::new(sink, modulator, converter, config);
    modem.transmit(&packet)?;
    modem.close()?;

    info!("transmitted {packet}");
    Ok(())
}
