use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use embedded_io_adapters::tokio_1::FromTokio;
use motescope_api::message::{BROADCAST_ADDR, ControlMsg, MoteMessage};
use motescope_api::transport::{AsyncPacketTransport, TransportError};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;

use super::Oscilloscope;
use crate::configs::settings::Bridge;

type Reader = AsyncPacketTransport<FromTokio<OwnedReadHalf>>;
type Writer = AsyncPacketTransport<FromTokio<OwnedWriteHalf>>;

/// Link between the oscilloscope and a serial forwarder. Reconnects forever.
pub struct MoteBridge {
    settings: Bridge,
    scope: Arc<Oscilloscope>,
    connected: Arc<AtomicBool>,
}

impl MoteBridge {
    pub fn new(settings: Bridge, scope: Arc<Oscilloscope>, connected: Arc<AtomicBool>) -> Self {
        Self {
            settings,
            scope,
            connected,
        }
    }

    pub async fn run(self, mut outbox: mpsc::UnboundedReceiver<ControlMsg>) {
        let address = format!("{}:{}", self.settings.host, self.settings.port);
        let delay = Duration::from_millis(self.settings.reconnect_delay_ms);

        loop {
            match self.connect(&address).await {
                Ok((reader, writer)) => {
                    tracing::info!("connected to serial forwarder at {}", address);
                    self.connected.store(true, Ordering::Release);

                    let reason = tokio::select! {
                        e = self.read_loop(reader) => e,
                        e = self.write_loop(writer, &mut outbox) => e,
                    };

                    self.connected.store(false, Ordering::Release);
                    tracing::warn!("serial forwarder link lost: {}", reason);
                    self.scope.report_warning(format!("Mote link lost: {reason}"));
                }
                Err(e) => {
                    tracing::warn!("cannot reach serial forwarder at {}: {}", address, e);
                }
            }

            // Nothing queued while offline is worth sending after a reconnect
            while outbox.try_recv().is_ok() {}

            tokio::time::sleep(delay).await;
        }
    }

    async fn connect(&self, address: &str) -> Result<(Reader, Writer), TransportError> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|e| TransportError::Io(e.to_string()))?;

        let mut transport = AsyncPacketTransport::new(FromTokio::new(stream));
        transport.handshake().await?;

        let (io, pending) = transport.into_parts();
        let (read_half, write_half) = io.into_inner().into_split();

        let reader = AsyncPacketTransport::from_parts(FromTokio::new(read_half), pending);
        let writer = AsyncPacketTransport::new(FromTokio::new(write_half))
            .with_source(self.settings.source)
            .with_group(self.settings.group);

        Ok((reader, writer))
    }

    async fn read_loop(&self, mut reader: Reader) -> TransportError {
        loop {
            match reader.receive_message().await {
                Ok((source, message)) => self.scope.message_received(source, message).await,
                Err(e @ (TransportError::Closed | TransportError::Io(_))) => return e,
                Err(e) => tracing::warn!("skipping undecodable packet: {}", e),
            }
        }
    }

    async fn write_loop(
        &self,
        mut writer: Writer,
        outbox: &mut mpsc::UnboundedReceiver<ControlMsg>,
    ) -> TransportError {
        while let Some(announcement) = outbox.recv().await {
            let message = MoteMessage::Control(announcement);

            match writer.send_message(BROADCAST_ADDR, &message).await {
                Ok(()) => tracing::debug!(
                    "broadcast interval {} version {}",
                    announcement.frequency,
                    announcement.version
                ),
                Err(e) => return e,
            }
        }

        TransportError::Closed
    }
}
