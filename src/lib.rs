/*! This crate is a software modem for APRS (Automatic Packet Reporting
System): it turns packet records into AFSK audio samples ready for a
voice-grade radio channel, and recovers packets from received audio.

# Architecture overview

The transmit side is a straight pipeline. Each stage is its own module
and is usable on its own:

```text
      [ Packet ]
          ↓
 [ AX.25 frame bytes ]     address + control + PID + payload + FCS
          ↓
   [ Bit sequence ]        LSB-first
          ↓
    [ Bit stuffing ]
          ↓
    [ HDLC flags ]         preamble and postamble
          ↓
   [ NRZI encoding ]
          ↓
    [ Modulator ]          one audio sample per step, samples_per_bit per bit
          ↓
 [ Pre-emphasis, gain ]
          ↓
   [ Audio sink ]          sound card, .au file, or an in-memory buffer
```

The receive side runs the same stages backwards, starting from the
hard-decision bits produced by a [`demodulator`](crate::demodulator).

Frames can optionally be wrapped in an [FX.25](crate::fx25) Reed–Solomon
envelope. The embedded AX.25 bitstream is carried verbatim, so receivers
that know nothing about FX.25 still decode the packet.

# Example

```
use aprsmodem::converter::{BitstreamConverter, Converter};
use aprsmodem::packet::Packet;

let packet = Packet {
    from: "N0CALL-10".into(),
    to: "APZ001".into(),
    path: vec!["WIDE1-1".into(), "WIDE2-2".into()],
    data: b"Hello, APRS!".to_vec(),
};
let bits = Converter::basic().encode(&packet, 45, 5);
let (decoded, read) = Converter::basic().try_decode(&bits, 0);
assert_eq!(decoded.unwrap(), packet);
// The scan stops just past the first postamble flag.
assert_eq!(read, bits.len() - 4 * 8);
```

## Links

* [APRS](https://en.wikipedia.org/wiki/Automatic_Packet_Reporting_System)
* [AX.25](https://en.wikipedia.org/wiki/AX.25)
* [Bell 202 / AFSK](https://en.wikipedia.org/wiki/Bell_202_modem)
 */

pub mod address;
pub mod au;
pub mod audio;
pub mod bessel_null;
pub mod bits;
pub mod bitstream;
pub mod converter;
pub mod cpfsk;
pub mod dds_afsk;
pub mod dds_afsk_fast;
pub mod demodulator;
pub mod frame;
pub mod fx25;
pub mod gf;
pub mod modem;
pub mod modulator;
pub mod packet;
pub mod reed_solomon;

#[cfg(feature = "audio")]
pub mod audio_sink;

/// Audio sample type used throughout the crate.
pub type Float = f64;

/// aprsmodem error.
#[derive(Debug, Clone)]
pub struct Error {
    msg: String,
}

impl Error {
    /// Create new error with message.
    pub fn new(msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "aprsmodem Error: {}", self.msg)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Error {
        Error::new(&format!("{}", e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::new(&format!("IO error: {}", e))
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
