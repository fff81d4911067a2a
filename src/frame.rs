/*! AX.25 UI frame assembly and disassembly.

Only connectionless UI frames are handled, which is all APRS ever uses:
control byte `0x03`, PID `0xF0` (no layer 3), and a CRC-16-CCITT frame
check sequence.

[ax25]: https://en.wikipedia.org/wiki/AX.25
*/
use log::debug;

use crate::address::Address;
use crate::bits::compute_crc;
use crate::packet::Packet;

/// UI frame control byte.
pub const CONTROL_UI: u8 = 0x03;

/// PID byte: no layer 3 protocol.
pub const PID_NONE: u8 = 0xF0;

/// Two addresses, control, PID and the FCS. Nothing shorter can be a
/// frame.
pub const MIN_FRAME_LEN: usize = 18;

/// Encode a packet into AX.25 frame bytes, FCS included.
pub fn encode_frame(p: &Packet) -> Vec<u8> {
    let to = Address::parse(&p.to);
    let from = Address::parse(&p.from);
    let path: Vec<Address> = p.path.iter().map(|s| Address::parse(s)).collect();

    let mut frame = encode_header(&from, &to, &path);
    frame.push(CONTROL_UI);
    frame.push(PID_NONE);
    frame.extend_from_slice(&p.data);

    let crc = compute_crc(&frame);
    frame.extend_from_slice(&crc);
    frame
}

/// Encode the address header: destination, source, then the path.
///
/// The extension bit goes on the final address. With an empty path that
/// is the source address, keeping the frame conformant.
pub fn encode_header(from: &Address, to: &Address, path: &[Address]) -> Vec<u8> {
    let mut header = Vec::with_capacity(14 + path.len() * 7);
    header.extend_from_slice(&to.encode(false));
    header.extend_from_slice(&from.encode(path.is_empty()));
    for (i, addr) in path.iter().enumerate() {
        header.extend_from_slice(&addr.encode(i == path.len() - 1));
    }
    header
}

/// Decode AX.25 frame bytes back into a packet.
///
/// Returns `None` on a short frame, FCS mismatch, or a header whose
/// control byte is missing or not on an address boundary.
pub fn try_decode_frame(frame: &[u8]) -> Option<Packet> {
    if frame.len() < MIN_FRAME_LEN {
        debug!("frame too short: {} bytes", frame.len());
        return None;
    }

    let crc = compute_crc(&frame[..frame.len() - 2]);
    if frame[frame.len() - 2..] != crc {
        debug!(
            "FCS mismatch: computed {:02x?}, received {:02x?}",
            crc,
            &frame[frame.len() - 2..]
        );
        return None;
    }

    let to = Address::decode(frame[0..7].try_into().ok()?);
    let from = Address::decode(frame[7..14].try_into().ok()?);

    // The control byte terminates the address chain. A well formed
    // address never contains 0x03 in its last byte, so the first match
    // must land on an address boundary.
    let control = 14 + frame[14..frame.len() - 2]
        .iter()
        .position(|&b| b == CONTROL_UI)?;
    if (control - 14) % 7 != 0 {
        debug!("control byte misaligned at offset {control}");
        return None;
    }
    if control + 1 >= frame.len() - 2 {
        debug!("no room for PID after control byte");
        return None;
    }

    let path = frame[14..control]
        .chunks_exact(7)
        .map(|c| {
            Address::decode(c.try_into().expect("chunks_exact(7)")).to_string()
        })
        .collect();

    let data = frame[control + 2..frame.len() - 2].to_vec();

    Some(Packet {
        from: from.to_string(),
        to: to.to_string(),
        path,
        data,
    })
}
