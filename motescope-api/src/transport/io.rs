use core::fmt::Debug;

use alloc::vec::Vec;

use embedded_io_async::{ErrorType as AsyncErrorType, Read as AsyncRead, Write as AsyncWrite};

use super::error::TransportError;
use super::packet::{DEFAULT_GROUP, SerialPacket};
use super::{DEFAULT_BUFFER_SIZE, FORWARDER_BANNER, MAX_PACKET_SIZE};
use crate::message::MoteMessage;

/// Packet stream speaking the serial forwarder protocol: a two byte banner
/// exchanged once, then every packet prefixed by its length in one byte.
#[derive(Debug)]
pub struct AsyncPacketTransport<IO> {
    io: IO,
    rx_buffer: Vec<u8>,
    source: u16,
    group: u8,
}

impl<IO> AsyncPacketTransport<IO> {
    pub fn new(io: IO) -> Self {
        Self {
            io,
            rx_buffer: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
            source: 0,
            group: DEFAULT_GROUP,
        }
    }

    /// Source address stamped on outgoing packets
    pub fn with_source(mut self, source: u16) -> Self {
        self.source = source;
        self
    }

    pub fn with_group(mut self, group: u8) -> Self {
        self.group = group;
        self
    }

    pub fn inner(&self) -> &IO {
        &self.io
    }

    pub fn into_inner(self) -> IO {
        self.io
    }

    /// Splits off the IO together with bytes already read but not consumed
    pub fn into_parts(self) -> (IO, Vec<u8>) {
        (self.io, self.rx_buffer)
    }

    /// Rebuilds a transport around `io`, resuming with `rx_buffer` as unread input
    pub fn from_parts(io: IO, rx_buffer: Vec<u8>) -> Self {
        Self {
            rx_buffer,
            ..Self::new(io)
        }
    }

    pub fn rx_buffer_len(&self) -> usize {
        self.rx_buffer.len()
    }
}

impl<IO> AsyncPacketTransport<IO>
where
    IO: AsyncRead + AsyncWrite + AsyncErrorType,
    IO::Error: Debug,
{
    /// Exchanges banners with the peer. Must run once before any packet.
    pub async fn handshake(&mut self) -> Result<(), TransportError> {
        self.io
            .write_all(&FORWARDER_BANNER)
            .await
            .map_err(|e| TransportError::Io(alloc::format!("{:?}", e)))?;
        self.io
            .flush()
            .await
            .map_err(|e| TransportError::Io(alloc::format!("{:?}", e)))?;

        self.ensure_buffer_has(FORWARDER_BANNER.len()).await?;
        let banner = [self.rx_buffer[0], self.rx_buffer[1]];
        self.rx_buffer.drain(..FORWARDER_BANNER.len());

        // Second byte carries the protocol revision; only the first is binding
        if banner[0] != FORWARDER_BANNER[0] {
            return Err(TransportError::Handshake(banner));
        }

        Ok(())
    }
}

impl<IO> AsyncPacketTransport<IO>
where
    IO: AsyncWrite + AsyncErrorType,
    IO::Error: Debug,
{
    pub async fn send_packet(&mut self, packet: &SerialPacket) -> Result<(), TransportError> {
        let bytes = packet.encode()?;

        if bytes.len() > MAX_PACKET_SIZE {
            return Err(TransportError::PacketTooLarge(bytes.len()));
        }

        let mut frame = Vec::with_capacity(bytes.len() + 1);
        frame.push(bytes.len() as u8);
        frame.extend_from_slice(&bytes);

        self.io
            .write_all(&frame)
            .await
            .map_err(|e| TransportError::Io(alloc::format!("{:?}", e)))?;
        self.io
            .flush()
            .await
            .map_err(|e| TransportError::Io(alloc::format!("{:?}", e)))?;

        Ok(())
    }

    pub async fn send_message(
        &mut self,
        dest: u16,
        message: &MoteMessage,
    ) -> Result<(), TransportError> {
        let packet = SerialPacket {
            dest,
            src: self.source,
            group: self.group,
            am_type: message.am_type() as u8,
            payload: message.encode(),
        };

        self.send_packet(&packet).await
    }
}

impl<IO> AsyncPacketTransport<IO>
where
    IO: AsyncRead + AsyncErrorType,
    IO::Error: Debug,
{
    pub async fn receive_packet(&mut self) -> Result<SerialPacket, TransportError> {
        self.ensure_buffer_has(1).await?;
        let length = self.rx_buffer[0] as usize;

        self.ensure_buffer_has(1 + length).await?;
        let packet = SerialPacket::decode(&self.rx_buffer[1..1 + length]);
        // Drop the frame even when it fails to parse so the stream stays aligned
        self.rx_buffer.drain(..1 + length);

        packet
    }

    /// Receives the next packet and decodes its payload, returning the
    /// packet's source address alongside the message.
    pub async fn receive_message(&mut self) -> Result<(u16, MoteMessage), TransportError> {
        let packet = self.receive_packet().await?;
        let message = MoteMessage::decode(packet.am_type, &packet.payload)?;

        Ok((packet.src, message))
    }

    async fn ensure_buffer_has(&mut self, required: usize) -> Result<(), TransportError> {
        while self.rx_buffer.len() < required {
            let mut temp_buf = [0u8; 512];
            let n = self
                .io
                .read(&mut temp_buf)
                .await
                .map_err(|e| TransportError::Io(alloc::format!("{:?}", e)))?;
            if n == 0 {
                return Err(TransportError::Closed);
            }
            self.rx_buffer.extend_from_slice(&temp_buf[..n]);
        }
        Ok(())
    }
}
