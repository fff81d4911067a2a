//! The APRS packet record.

use std::fmt;

/// One APRS packet, as handed to and produced by the codec layers.
///
/// Addresses are carried in their text form; parsing happens at the
/// AX.25 boundary. The payload is raw bytes and may contain anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    /// Source address.
    pub from: String,
    /// Destination address.
    pub to: String,
    /// Digipeater path, in transmission order.
    pub path: Vec<String>,
    /// Information field payload.
    pub data: Vec<u8>,
}

impl fmt::Display for Packet {
    /// The TNC2 monitor format: `FROM>TO,PATH1,PATH2:payload`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}>{}", self.from, self.to)?;
        for p in &self.path {
            write!(f, ",{}", p)?;
        }
        write!(f, ":{}", String::from_utf8_lossy(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let p = Packet {
            from: "N0CALL-10".into(),
            to: "APZ001".into(),
            path: vec!["WIDE1-1".into(), "WIDE2-2".into()],
            data: b"Hello, APRS!".to_vec(),
        };
        assert_eq!(
            p.to_string(),
            "N0CALL-10>APZ001,WIDE1-1,WIDE2-2:Hello, APRS!"
        );

        let p = Packet {
            from: "N0CALL".into(),
            to: "APZ001".into(),
            path: vec![],
            data: vec![],
        };
        assert_eq!(p.to_string(), "N0CALL>APZ001:");
    }
}
