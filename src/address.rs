/*! APRS text addresses and their AX.25 7-byte encoding.

An address is a callsign with optional decorations:

```text
N0CALL-10     callsign with SSID 10
WIDE2-1       path alias: n=2 initial hops, 1 remaining
WIDE2         path alias with no remaining-hops digit
WIDE1-1*      the trailing '*' marks the hop as used
```

Parsing is deliberately lenient. Text that fits none of the forms above
is preserved verbatim with all numeric fields zero, so a router can
still carry an unusual address through unchanged.

[aprs]: https://en.wikipedia.org/wiki/Automatic_Packet_Reporting_System
*/
use std::fmt;

/// One AX.25 address slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Callsign prefix, up to 6 characters after normalization.
    pub text: String,
    /// Generic hop count digit of an `n-N` path alias, 0 when absent.
    pub n: u8,
    /// Remaining hop count of an `n-N` path alias, 0 when absent.
    pub remaining: u8,
    /// Secondary station identifier, 0..=15. Displaced by the `n-N`
    /// form when that one parses.
    pub ssid: u8,
    /// The "has been repeated" H-bit, written as a trailing `*`.
    pub mark: bool,
}

impl Address {
    /// Parse the text form. Never fails: anything that doesn't match a
    /// known shape comes back with `text` as given and zeroed fields.
    pub fn parse(s: &str) -> Address {
        let mut addr = Address {
            text: s.to_string(),
            ..Default::default()
        };

        let mut text = s;
        if let Some(stripped) = text.strip_suffix('*') {
            addr.mark = true;
            text = stripped;
            addr.text = text.to_string();
        }

        let bytes = text.as_bytes();
        let Some(sep) = text.find('-') else {
            // No separator. A single trailing digit 1..=7 is a path
            // alias like WIDE2.
            if let Some(&last) = bytes.last() {
                if last.is_ascii_digit() {
                    let n = last - b'0';
                    if (1..=7).contains(&n) {
                        addr.n = n;
                        addr.text = text[..text.len() - 1].to_string();
                    }
                }
            }
            return addr;
        };

        // Exactly one digit on each side of the separator, with the
        // separator last-but-two: the n-N form, ex WIDE1-1. Anything
        // else with a separator is treated as callsign plus SSID.
        if sep >= 1
            && bytes[sep - 1].is_ascii_digit()
            && sep + 1 < bytes.len()
            && bytes[sep + 1].is_ascii_digit()
            && sep + 2 == bytes.len()
        {
            let n = bytes[sep - 1] - b'0';
            let remaining = bytes[sep + 1] - b'0';
            if (1..=7).contains(&n) && remaining <= 7 {
                addr.n = n;
                addr.remaining = remaining;
                addr.text = text[..sep - 1].to_string();
            }
            return addr;
        }

        // SSID form: separator followed by one or two digits, ex CALL-1
        // or CALL-12.
        if sep + 1 < bytes.len() && bytes[sep + 1].is_ascii_digit() {
            let suffix = &text[sep + 1..];
            if suffix.len() <= 2 && suffix.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(ssid) = suffix.parse::<u8>() {
                    if ssid <= 15 {
                        addr.ssid = ssid;
                        addr.text = text[..sep].to_string();
                    }
                }
            }
        }

        addr
    }

    /// Encode into the 7-byte AX.25 address field.
    ///
    /// `last` must be set only on the final address of the header
    /// chain; it becomes the extension bit.
    pub fn encode(&self, last: bool) -> [u8; 7] {
        let mut text = self.text.clone();
        if self.n > 0 {
            text.push((b'0' + self.n) as char);
        }
        let mut ssid = 0;
        if self.remaining > 0 {
            ssid = self.remaining;
        }
        if self.ssid > 0 {
            ssid = self.ssid;
        }
        encode_parts(&text, ssid, self.mark, last)
    }

    /// Decode a 7-byte AX.25 address field.
    ///
    /// The raw callsign/SSID/H-bit triple is serialized to text and
    /// re-parsed, which is what re-applies the trailing-digit and `n-N`
    /// interpretations.
    pub fn decode(bytes: &[u8; 7]) -> Address {
        let (text, ssid, mark) = decode_parts(bytes);
        let raw = Address {
            text,
            ssid,
            mark,
            ..Default::default()
        };
        Address::parse(&raw.to_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.text.is_empty() {
            return Ok(());
        }
        write!(f, "{}", self.text)?;
        if self.n > 0 {
            write!(f, "{}", self.n)?;
        }
        if self.remaining > 0 {
            write!(f, "-{}", self.remaining)?;
        }
        if self.ssid > 0 {
            write!(f, "-{}", self.ssid)?;
        }
        if self.mark {
            write!(f, "*")?;
        }
        Ok(())
    }
}

/// Encode a raw callsign/SSID/H-bit triple into 7 bytes.
///
/// Bytes 0..=5 are the callsign, space padded, each shifted left one
/// bit. Byte 6 packs everything else:
///
/// ```text
///    H-bit  reserved    SSID     last
///   ---------------------------------
///      7      6 5      4 3 2 1     0
/// ```
///
/// The SSID nibble is written as `(ssid + '0') << 1`. For SSID 10..=15
/// the digit overflows into the reserved bits; that is what this modem
/// family has always put on the air, and the decoder masks it back out,
/// so the quirk is kept.
pub fn encode_parts(text: &str, ssid: u8, mark: bool, last: bool) -> [u8; 7] {
    let mut data = [b' ' << 1; 7];

    for (i, &b) in text.as_bytes().iter().take(6).enumerate() {
        data[i] = b << 1;
    }

    data[6] = 0x60;
    data[6] |= (ssid + b'0') << 1;
    if last {
        data[6] |= 0x01;
    }
    if mark {
        data[6] |= 0x80;
    }

    data
}

/// Decode 7 address bytes into the raw callsign/SSID/H-bit triple.
pub fn decode_parts(bytes: &[u8; 7]) -> (String, u8, bool) {
    let text: String = bytes[..6].iter().map(|&b| (b >> 1) as char).collect();
    let text = text.trim_end_matches(' ').to_string();
    let ssid = (bytes[6] >> 1) & 0x0F;
    let mark = bytes[6] & 0x80 != 0;
    (text, ssid, mark)
}
