use alloc::vec::Vec;

use super::error::TransportError;

/// Dispatch byte of a serial Active Message packet
pub const AM_DISPATCH: u8 = 0x00;

/// Default AM group of the demo network
pub const DEFAULT_GROUP: u8 = 0x22;

/// Serial Active Message packet as exchanged with a serial forwarder.
///
/// Layout: `dispatch:u8 dest:u16 src:u16 length:u8 group:u8 type:u8 payload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPacket {
    pub dest: u16,
    pub src: u16,
    pub group: u8,
    pub am_type: u8,
    pub payload: Vec<u8>,
}

impl SerialPacket {
    /// dispatch(1) + dest(2) + src(2) + length(1) + group(1) + type(1)
    pub const HEADER_SIZE: usize = 8;

    /// Largest payload the one-byte length field can describe
    pub const MAX_PAYLOAD: usize = u8::MAX as usize;

    pub fn encode(&self) -> Result<Vec<u8>, TransportError> {
        if self.payload.len() > Self::MAX_PAYLOAD {
            return Err(TransportError::PacketTooLarge(self.payload.len()));
        }

        let mut buffer = Vec::with_capacity(Self::HEADER_SIZE + self.payload.len());

        buffer.push(AM_DISPATCH);
        buffer.extend_from_slice(&self.dest.to_be_bytes());
        buffer.extend_from_slice(&self.src.to_be_bytes());
        buffer.push(self.payload.len() as u8);
        buffer.push(self.group);
        buffer.push(self.am_type);
        buffer.extend_from_slice(&self.payload);

        Ok(buffer)
    }

    pub fn decode(data: &[u8]) -> Result<Self, TransportError> {
        if data.len() < Self::HEADER_SIZE {
            return Err(TransportError::Protocol(
                "Insufficient data for packet header".into(),
            ));
        }

        if data[0] != AM_DISPATCH {
            return Err(TransportError::UnknownDispatch(data[0]));
        }

        let length = data[5] as usize;
        let payload = &data[Self::HEADER_SIZE..];
        if payload.len() != length {
            return Err(TransportError::PayloadLength {
                expected: length,
                actual: payload.len(),
            });
        }

        Ok(Self {
            dest: u16::from_be_bytes([data[1], data[2]]),
            src: u16::from_be_bytes([data[3], data[4]]),
            group: data[6],
            am_type: data[7],
            payload: payload.to_vec(),
        })
    }

    /// Returns total encoded size including the header
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_packet_header_layout() {
        let packet = SerialPacket {
            dest: 0xFFFF,
            src: 0x0001,
            group: DEFAULT_GROUP,
            am_type: 0x94,
            payload: vec![1, 0, 100, 0, 1],
        };

        let encoded = packet.encode().unwrap();
        assert_eq!(&encoded[..SerialPacket::HEADER_SIZE], &[0x00, 0xFF, 0xFF, 0x00, 0x01, 5, 0x22, 0x94]);
        assert_eq!(encoded.len(), packet.size());
        assert_eq!(SerialPacket::decode(&encoded).unwrap(), packet);
    }

    #[test]
    fn test_packet_decode_errors() {
        assert!(matches!(
            SerialPacket::decode(&[0, 1, 2]),
            Err(TransportError::Protocol(_))
        ));

        let wrong_dispatch = [0x45, 0, 0, 0, 0, 0, 0x22, 0x93];
        assert_eq!(
            SerialPacket::decode(&wrong_dispatch),
            Err(TransportError::UnknownDispatch(0x45))
        );

        let short_payload = [0x00, 0, 0, 0, 0, 4, 0x22, 0x93, 1, 2];
        assert_eq!(
            SerialPacket::decode(&short_payload),
            Err(TransportError::PayloadLength { expected: 4, actual: 2 })
        );
    }

    #[test]
    fn test_packet_too_large() {
        let packet = SerialPacket {
            dest: 0,
            src: 0,
            group: 0,
            am_type: 0x93,
            payload: vec![0; 300],
        };

        assert_eq!(packet.encode(), Err(TransportError::PacketTooLarge(300)));
    }
}
