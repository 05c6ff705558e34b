use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::transport::TransportError;

/// Mote identifier as carried in the sample payload
pub type MoteId = u16;

/// Sampling period motes boot with, in milliseconds
pub const DEFAULT_INTERVAL: u16 = 100;

/// Node id the base station signs control messages with
pub const BASE_STATION_ID: u8 = 1;

/// Active Message broadcast address
pub const BROADCAST_ADDR: u16 = 0xFFFF;

/// Raw reading value standing for "no data"
pub const MISSING_READING: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AmType {
    /// Periodic readings reported by a mote
    Sample = 0x93,
    /// Sampling interval and its version
    Control = 0x94,
}

impl AmType {
    pub fn from_u8(value: u8) -> Result<Self, TransportError> {
        match value {
            0x93 => Ok(Self::Sample),
            0x94 => Ok(Self::Control),
            other => Err(TransportError::UnknownAmType(other)),
        }
    }
}

pub fn decode_reading(raw: u16) -> Option<u16> {
    (raw != MISSING_READING).then_some(raw)
}

pub fn encode_reading(reading: Option<u16>) -> u16 {
    reading.unwrap_or(MISSING_READING)
}

/// One reading event as reported by a mote.
///
/// Layout (network byte order): `node_id:u8 version:u16 interval:u16
/// time:u16 temperature:u16 humidity:u16 light:u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMsg {
    pub node_id: u8,
    /// Interval version the mote currently follows
    pub version: u16,
    /// Interval the mote currently samples at
    pub interval: u16,
    /// Running sample counter
    pub time: u16,
    pub temperature: Option<u16>,
    pub humidity: Option<u16>,
    pub light: Option<u16>,
}

impl SampleMsg {
    pub const SIZE: usize = 13;

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::SIZE);

        buffer.push(self.node_id);
        buffer.extend_from_slice(&self.version.to_be_bytes());
        buffer.extend_from_slice(&self.interval.to_be_bytes());
        buffer.extend_from_slice(&self.time.to_be_bytes());
        buffer.extend_from_slice(&encode_reading(self.temperature).to_be_bytes());
        buffer.extend_from_slice(&encode_reading(self.humidity).to_be_bytes());
        buffer.extend_from_slice(&encode_reading(self.light).to_be_bytes());

        buffer
    }

    pub fn decode(data: &[u8]) -> Result<Self, TransportError> {
        if data.len() != Self::SIZE {
            return Err(TransportError::PayloadLength {
                expected: Self::SIZE,
                actual: data.len(),
            });
        }

        let word = |offset: usize| u16::from_be_bytes([data[offset], data[offset + 1]]);

        Ok(Self {
            node_id: data[0],
            version: word(1),
            interval: word(3),
            time: word(5),
            temperature: decode_reading(word(7)),
            humidity: decode_reading(word(9)),
            light: decode_reading(word(11)),
        })
    }
}

/// Interval announcement. Sent by the base station to all motes, and echoed
/// by motes that want to advertise their own version.
///
/// Layout (network byte order): `root_id:u8 frequency:u16 version:u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMsg {
    pub root_id: u8,
    pub frequency: u16,
    pub version: u16,
}

impl ControlMsg {
    pub const SIZE: usize = 5;

    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::SIZE);

        buffer.push(self.root_id);
        buffer.extend_from_slice(&self.frequency.to_be_bytes());
        buffer.extend_from_slice(&self.version.to_be_bytes());

        buffer
    }

    pub fn decode(data: &[u8]) -> Result<Self, TransportError> {
        if data.len() != Self::SIZE {
            return Err(TransportError::PayloadLength {
                expected: Self::SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            root_id: data[0],
            frequency: u16::from_be_bytes([data[1], data[2]]),
            version: u16::from_be_bytes([data[3], data[4]]),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoteMessage {
    Sample(SampleMsg),
    Control(ControlMsg),
}

impl MoteMessage {
    pub fn am_type(&self) -> AmType {
        match self {
            Self::Sample(_) => AmType::Sample,
            Self::Control(_) => AmType::Control,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Sample(msg) => msg.encode(),
            Self::Control(msg) => msg.encode(),
        }
    }

    pub fn decode(am_type: u8, payload: &[u8]) -> Result<Self, TransportError> {
        match AmType::from_u8(am_type)? {
            AmType::Sample => SampleMsg::decode(payload).map(Self::Sample),
            AmType::Control => ControlMsg::decode(payload).map(Self::Control),
        }
    }

    /// Version and interval this message advertises
    pub fn announcement(&self) -> (u16, u16) {
        match self {
            Self::Sample(msg) => (msg.version, msg.interval),
            Self::Control(msg) => (msg.version, msg.frequency),
        }
    }
}

impl From<SampleMsg> for MoteMessage {
    fn from(msg: SampleMsg) -> Self {
        Self::Sample(msg)
    }
}

impl From<ControlMsg> for MoteMessage {
    fn from(msg: ControlMsg) -> Self {
        Self::Control(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_layout() {
        let msg = SampleMsg {
            node_id: 7,
            version: 2,
            interval: 250,
            time: 0x0102,
            temperature: Some(0x1234),
            humidity: None,
            light: Some(100),
        };

        let encoded = msg.encode();
        assert_eq!(encoded.len(), SampleMsg::SIZE);
        assert_eq!(
            encoded,
            [7, 0, 2, 0, 250, 1, 2, 0x12, 0x34, 0xFF, 0xFF, 0, 100]
        );
        assert_eq!(SampleMsg::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_control_layout() {
        let msg = ControlMsg {
            root_id: 1,
            frequency: 1000,
            version: 3,
        };

        assert_eq!(msg.encode(), [1, 0x03, 0xE8, 0, 3]);
    }

    #[test]
    fn test_missing_reading_sentinel() {
        assert_eq!(decode_reading(MISSING_READING), None);
        assert_eq!(decode_reading(0), Some(0));
        assert_eq!(encode_reading(None), MISSING_READING);
        assert_eq!(encode_reading(Some(42)), 42);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(
            SampleMsg::decode(&[0; 4]),
            Err(TransportError::PayloadLength { expected: 13, actual: 4 })
        );
        assert!(ControlMsg::decode(&[0; 6]).is_err());
    }

    #[test]
    fn test_dispatch_by_am_type() {
        let control = ControlMsg {
            root_id: 1,
            frequency: 20,
            version: 7,
        };

        let decoded = MoteMessage::decode(0x94, &control.encode()).unwrap();
        assert_eq!(decoded, MoteMessage::Control(control));
        assert_eq!(decoded.announcement(), (7, 20));

        assert_eq!(
            MoteMessage::decode(0x10, &[]),
            Err(TransportError::UnknownAmType(0x10))
        );
    }
}
