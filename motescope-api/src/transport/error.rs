use core::fmt;

use alloc::string::String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// I/O operation failed
    Io(String),
    /// Peer closed the stream
    Closed,
    /// Peer answered the handshake with something other than a forwarder banner
    Handshake([u8; 2]),
    /// Packet did not start with the Active Message dispatch byte
    UnknownDispatch(u8),
    /// Active Message type is not one this application speaks
    UnknownAmType(u8),
    /// Payload length does not match the message layout
    PayloadLength { expected: usize, actual: usize },
    /// Packet exceeds what a one-byte length prefix can carry
    PacketTooLarge(usize),
    /// Packet format violation
    Protocol(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Closed => write!(f, "Connection closed"),
            Self::Handshake(banner) => write!(f, "Handshake rejected: {:02x?}", banner),
            Self::UnknownDispatch(d) => write!(f, "Unknown dispatch: {:#04x}", d),
            Self::UnknownAmType(t) => write!(f, "Unknown AM type: {:#04x}", t),
            Self::PayloadLength { expected, actual } => {
                write!(f, "Payload length {} does not match expected {}", actual, expected)
            }
            Self::PacketTooLarge(size) => write!(f, "Packet too large: {} bytes", size),
            Self::Protocol(e) => write!(f, "Protocol error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}
