pub mod error;
pub mod io;
pub mod packet;

pub use error::TransportError;
pub use io::AsyncPacketTransport;
pub use packet::{AM_DISPATCH, DEFAULT_GROUP, SerialPacket};

/// Banner both ends of a serial forwarder connection send first
pub const FORWARDER_BANNER: [u8; 2] = *b"U ";

/// Default buffer size for transport operations
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Largest packet a one-byte length prefix can frame
pub const MAX_PACKET_SIZE: usize = u8::MAX as usize;
