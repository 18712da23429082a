//! Wire framing: a fixed binary header followed by a UTF-8 pipe-delimited text payload.
//! Payloads themselves are built/parsed per message kind in [`crate::msg`].

pub const HEADER_LEN: usize = 16;

#[derive(Debug)]
pub enum ProtocolError {
    TooShort(usize),
    Utf8(std::str::Utf8Error),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort(len) => write!(f, "message too short: {len} bytes"),
            Self::Utf8(e) => write!(f, "payload not utf-8: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// `protocol_version | type | payload_size | reserved`, little-endian, 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub protocol_version: u16,
    pub kind: u16,
    pub payload_size: u32,
    pub reserved: u64,
}

impl MessageHeader {
    pub fn new(kind: u16, payload_size: u32) -> Self {
        Self {
            protocol_version: crate::config::PROTOCOL_VERSION,
            kind,
            payload_size,
            reserved: 0,
        }
    }

    pub fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..2].copy_from_slice(&self.protocol_version.to_le_bytes());
        buf[2..4].copy_from_slice(&self.kind.to_le_bytes());
        buf[4..8].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[8..16].copy_from_slice(&self.reserved.to_le_bytes());
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < HEADER_LEN {
            return Err(ProtocolError::TooShort(bytes.len()));
        }
        Ok(Self {
            protocol_version: u16::from_le_bytes([bytes[0], bytes[1]]),
            kind: u16::from_le_bytes([bytes[2], bytes[3]]),
            payload_size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            reserved: u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
        })
    }
}

/// Encodes one frame: header bytes followed by the raw payload bytes.
pub fn encode_frame(kind: u16, payload: &str) -> Vec<u8> {
    let body = payload.as_bytes();
    let header = MessageHeader::new(kind, body.len() as u32);
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(body);
    frame
}

/// Parses a payload slice as UTF-8 text (the header itself is parsed by the caller,
/// which is also the one that knows how many payload bytes to read off the stream).
pub fn decode_payload(bytes: &[u8]) -> Result<&str, ProtocolError> {
    std::str::from_utf8(bytes).map_err(ProtocolError::Utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1. Header round-trips through bytes.
    #[test]
    fn header_round_trips() {
        let h = MessageHeader {
            protocol_version: 1,
            kind: 42,
            payload_size: 7,
            reserved: 0,
        };
        let bytes = h.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN);
        let parsed = MessageHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, h);
    }

    // 2. A too-short buffer is rejected.
    #[test]
    fn header_from_short_buffer_errs() {
        assert!(matches!(
            MessageHeader::from_bytes(&[0u8; 4]),
            Err(ProtocolError::TooShort(4))
        ));
    }

    // 3. encode_frame sizes the header to match the payload.
    #[test]
    fn encode_frame_sets_payload_size() {
        let frame = encode_frame(30, "999|42");
        let header = MessageHeader::from_bytes(&frame).unwrap();
        assert_eq!(header.payload_size as usize, "999|42".len());
        assert_eq!(&frame[HEADER_LEN..], b"999|42");
    }
}
