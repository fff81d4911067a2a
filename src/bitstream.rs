/*! The basic on-air bitstream: HDLC framing plus NRZI.

Encoding takes AX.25 frame bytes through bit stuffing, flag
delimitation and NRZI line coding. Decoding is the reverse, driven from
an arbitrary offset so a caller can scan a long recording:

```text
offset ──▶ NRZI decode ──▶ skip preamble flags ──▶ frame bits up to
           the next flag ──▶ unstuff ──▶ bytes ──▶ AX.25 decode
```

The `read` count returned by [`try_decode_basic_bitstream`] always
points just past the terminating flag, so the scan makes progress even
when a candidate frame turns out to be garbage. `read == 0` means no
flag was found and the scan is done.
*/
use log::{debug, info};

use crate::bits::{
    add_hdlc_flags, bit_stuff, bit_unstuff, bits_to_bytes, bytes_to_bits,
    find_first_hdlc_flag, find_last_consecutive_hdlc_flag, nrzi_decode, nrzi_encode,
};
use crate::frame::{encode_frame, try_decode_frame};
use crate::packet::Packet;

/// Encode a packet into the complete NRZI bitstream, preamble and
/// postamble flags included.
pub fn encode_basic_bitstream(
    p: &Packet,
    preamble_flags: usize,
    postamble_flags: usize,
) -> Vec<u8> {
    let frame = encode_frame(p);

    let mut frame_bits = Vec::with_capacity(frame.len() * 8);
    bytes_to_bits(&frame, &mut frame_bits);

    let mut stuffed = Vec::with_capacity(frame_bits.len() + frame_bits.len() / 5);
    bit_stuff(&frame_bits, &mut stuffed);

    let mut bitstream =
        Vec::with_capacity(stuffed.len() + 8 * (preamble_flags + postamble_flags));
    add_hdlc_flags(&mut bitstream, preamble_flags);
    bitstream.extend_from_slice(&stuffed);
    add_hdlc_flags(&mut bitstream, postamble_flags);

    nrzi_encode(&mut bitstream);
    bitstream
}

/// Try to decode one frame from `bitstream`, starting at `offset`.
///
/// Returns the decoded packet (or `None` for an invalid candidate) and
/// the number of bits consumed. Callers add `read` to their offset and
/// keep scanning; `read == 0` means no further progress is possible.
pub fn try_decode_basic_bitstream(bitstream: &[u8], offset: usize) -> (Option<Packet>, usize) {
    if offset >= bitstream.len() {
        return (None, 0);
    }

    let mut window = bitstream[offset..].to_vec();
    nrzi_decode(&mut window);

    let Some(preamble) = find_last_consecutive_hdlc_flag(&window) else {
        debug!("no preamble flag in window");
        return (None, 0);
    };
    let start = preamble + 8;

    let Some(end) = find_first_hdlc_flag(&window[start..]).map(|i| start + i) else {
        debug!("no terminating flag after preamble");
        return (None, 0);
    };
    let read = end + 8;

    let mut unstuffed = Vec::with_capacity(end - start);
    bit_unstuff(&window[start..end], &mut unstuffed);
    // Stuffed bits were consumed above; whatever is left over of a
    // partial byte cannot be frame data.
    unstuffed.truncate(unstuffed.len() / 8 * 8);

    let mut bytes = Vec::with_capacity(unstuffed.len() / 8);
    bits_to_bytes(&unstuffed, &mut bytes);

    let packet = try_decode_frame(&bytes);
    if let Some(ref p) = packet {
        info!("captured packet: {p}");
    }
    (packet, read)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golden_packet() -> Packet {
        Packet {
            from: "N0CALL-10".into(),
            to: "APZ001".into(),
            path: vec!["WIDE1-1".into(), "WIDE2-2".into()],
            data: b"Hello, APRS!".to_vec(),
        }
    }

    // The full on-air bitstream for the golden packet with one flag on
    // each side, NRZI already applied.
    fn golden_bitstream() -> Vec<u8> {
        vec![
            // Preamble HDLC flag
            1, 1, 1, 1, 1, 1, 1, 0, //
            // Destination: APZ001
            1, 1, 0, 1, 0, 1, 0, 0, //
            1, 0, 1, 0, 1, 1, 0, 0, //
            1, 0, 0, 1, 1, 1, 0, 0, //
            1, 0, 1, 0, 1, 1, 1, 0, //
            1, 0, 1, 0, 1, 1, 1, 0, //
            1, 1, 0, 1, 0, 0, 0, 1, //
            0, 1, 0, 1, 0, 0, 0, 1, //
            // Source: N0CALL-10
            0, 1, 1, 1, 1, 0, 1, 1, //
            0, 1, 0, 1, 0, 0, 0, 1, //
            0, 0, 0, 1, 0, 1, 0, 0, //
            1, 1, 0, 1, 0, 1, 0, 0, //
            1, 0, 1, 1, 1, 0, 1, 1, //
            0, 1, 0, 0, 0, 1, 0, 0, //
            1, 0, 0, 1, 1, 1, 1, 0, //
            // Path 1: WIDE1-1
            1, 1, 1, 1, 0, 0, 1, 1, //
            0, 0, 1, 0, 0, 1, 0, 0, //
            1, 0, 1, 1, 0, 1, 0, 0, //
            1, 1, 0, 0, 1, 0, 1, 1, //
            0, 0, 1, 0, 1, 1, 1, 0, //
            1, 0, 1, 0, 1, 0, 0, 1, //
            0, 0, 1, 0, 1, 1, 1, 0, //
            // Path 2: WIDE2-2
            1, 1, 1, 1, 0, 0, 1, 1, //
            0, 0, 1, 0, 0, 1, 0, 0, //
            1, 0, 1, 1, 0, 1, 0, 0, //
            1, 1, 0, 0, 1, 0, 1, 1, //
            0, 1, 1, 0, 1, 1, 1, 0, //
            1, 0, 1, 0, 1, 0, 0, 1, //
            1, 0, 0, 1, 0, 0, 0, 1, //
            // Control, PID
            1, 1, 0, 1, 0, 1, 0, 1, //
            0, 1, 0, 1, 1, 1, 1, 1, //
            // Data: "Hello, APRS!"
            0, 1, 0, 0, 1, 0, 0, 1, //
            1, 0, 0, 1, 0, 0, 0, 1, //
            0, 1, 1, 1, 0, 0, 0, 1, //
            0, 1, 1, 1, 0, 0, 0, 1, //
            1, 1, 1, 1, 0, 0, 0, 1, //
            0, 1, 1, 1, 0, 0, 1, 0, //
            1, 0, 1, 0, 1, 1, 0, 1, //
            1, 0, 1, 0, 1, 0, 0, 1, //
            0, 1, 0, 1, 1, 0, 0, 1, //
            0, 0, 1, 0, 0, 1, 1, 0, //
            0, 0, 1, 0, 0, 1, 1, 0, //
            0, 1, 0, 1, 0, 0, 1, 0, //
            // FCS, little-endian
            1, 0, 1, 0, 0, 1, 1, 0, //
            0, 0, 1, 1, 1, 1, 1, 0, //
            // Postamble HDLC flag
            1, 1, 1, 1, 1, 1, 1, 0,
        ]
    }

    #[test]
    fn encode_golden() {
        let bitstream = encode_basic_bitstream(&golden_packet(), 1, 1);
        assert_eq!(bitstream.len(), 368);
        assert_eq!(bitstream, golden_bitstream());
    }

    #[test]
    fn decode_golden() {
        let (packet, read) = try_decode_basic_bitstream(&golden_bitstream(), 0);
        assert_eq!(read, 368);
        assert_eq!(
            packet.unwrap().to_string(),
            "N0CALL-10>APZ001,WIDE1-1,WIDE2-2:Hello, APRS!"
        );
    }

    #[test]
    fn round_trip_long_preamble() {
        let p = golden_packet();
        let bits = encode_basic_bitstream(&p, 45, 30);
        let (packet, read) = try_decode_basic_bitstream(&bits, 0);
        assert_eq!(packet.unwrap(), p);
        // The scan stops just past the first postamble flag.
        assert_eq!(read, bits.len() - 29 * 8);
    }

    #[test]
    fn no_flags_is_terminal() {
        assert_eq!(try_decode_basic_bitstream(&[], 0), (None, 0));
        let (packet, read) = try_decode_basic_bitstream(&[0, 1, 0, 1, 0, 1, 0, 1, 0, 1], 0);
        assert_eq!(packet, None);
        assert_eq!(read, 0);
    }

    #[test]
    fn unterminated_frame_is_terminal() {
        let bits = encode_basic_bitstream(&golden_packet(), 1, 1);
        // Cut the postamble off, leaving no closing flag.
        let (packet, read) = try_decode_basic_bitstream(&bits[..bits.len() - 8], 0);
        assert_eq!(packet, None);
        assert_eq!(read, 0);
    }

    #[test]
    fn corrupt_frame_still_advances() {
        let mut bits = encode_basic_bitstream(&golden_packet(), 1, 1);
        // Flip one payload bit. The FCS check fails but the scan must
        // still move past the terminating flag.
        bits[200] ^= 1;
        let (packet, read) = try_decode_basic_bitstream(&bits, 0);
        assert_eq!(packet, None);
        assert_eq!(read, 368);
    }

    #[test]
    fn scan_recovers_every_frame() {
        // A long recording of back-to-back transmissions, as produced
        // by repeated encodes. The offset scan must find them all.
        let mut recording = Vec::new();
        let mut want = Vec::new();
        for i in 0..50 {
            let p = Packet {
                from: format!("N0CALL-{}", i % 15 + 1),
                to: "APZ001".into(),
                path: vec!["WIDE1-1".into()],
                data: format!("status report {i}").into_bytes(),
            };
            recording.extend(encode_basic_bitstream(&p, 4, 2));
            want.push(p);
        }

        let mut got = Vec::new();
        let mut offset = 0;
        while offset < recording.len() {
            let (packet, read) = try_decode_basic_bitstream(&recording, offset);
            if let Some(p) = packet {
                got.push(p);
            }
            if read == 0 {
                break;
            }
            offset += read;
        }
        assert_eq!(got, want);
    }
}
