use std::net::SocketAddr;

use embedded_io_adapters::tokio_1::FromTokio;
use motescope_api::message::{BROADCAST_ADDR, MoteMessage};
use motescope_api::transport::{AsyncPacketTransport, SerialPacket, TransportError};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

type Reader = AsyncPacketTransport<FromTokio<OwnedReadHalf>>;
type Writer = AsyncPacketTransport<FromTokio<OwnedWriteHalf>>;

/// Serial forwarder stand-in: every connected client hears the motes'
/// samples and may put control messages on air.
pub struct MockForwarder {
    listener: TcpListener,
    air: broadcast::Sender<MoteMessage>,
    group: u8,
}

impl MockForwarder {
    pub fn new(listener: TcpListener, air: broadcast::Sender<MoteMessage>, group: u8) -> Self {
        Self {
            listener,
            air,
            group,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn serve(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::info!("client {} connected", peer);

                    let air = self.air.clone();
                    let group = self.group;
                    tokio::spawn(async move {
                        let reason = handle_client(stream, air, group).await;
                        tracing::info!("client {} disconnected: {}", peer, reason);
                    });
                }
                Err(e) => tracing::error!("failed to accept client: {}", e),
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    air: broadcast::Sender<MoteMessage>,
    group: u8,
) -> TransportError {
    let mut transport = AsyncPacketTransport::new(FromTokio::new(stream)).with_group(group);
    if let Err(e) = transport.handshake().await {
        return e;
    }

    let (io, pending) = transport.into_parts();
    let (read_half, write_half) = io.into_inner().into_split();
    let reader = AsyncPacketTransport::from_parts(FromTokio::new(read_half), pending);
    let writer = AsyncPacketTransport::new(FromTokio::new(write_half)).with_group(group);

    // Subscribe before the first await so no sample slips through
    let radio = air.subscribe();

    tokio::select! {
        e = uplink(reader, &air) => e,
        e = downlink(writer, radio, group) => e,
    }
}

/// Client to motes
async fn uplink(mut reader: Reader, air: &broadcast::Sender<MoteMessage>) -> TransportError {
    loop {
        match reader.receive_message().await {
            Ok((_, MoteMessage::Control(control))) => {
                tracing::info!(
                    "client announces interval {} version {}",
                    control.frequency,
                    control.version
                );
                let _ = air.send(MoteMessage::Control(control));
            }
            Ok((source, message)) => {
                tracing::debug!("ignoring {:?} from client {}", message.am_type(), source);
            }
            Err(e @ (TransportError::Closed | TransportError::Io(_))) => return e,
            Err(e) => tracing::warn!("dropping bad packet from client: {}", e),
        }
    }
}

/// Motes to client. Only samples are forwarded, the client's own
/// announcements are not echoed back.
async fn downlink(
    mut writer: Writer,
    mut radio: broadcast::Receiver<MoteMessage>,
    group: u8,
) -> TransportError {
    loop {
        let sample = match radio.recv().await {
            Ok(MoteMessage::Sample(sample)) => sample,
            Ok(MoteMessage::Control(_)) => continue,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("client fell behind, {} messages lost", skipped);
                continue;
            }
            Err(RecvError::Closed) => return TransportError::Closed,
        };

        let message = MoteMessage::Sample(sample);
        let packet = SerialPacket {
            dest: BROADCAST_ADDR,
            src: u16::from(sample.node_id),
            group,
            am_type: message.am_type() as u8,
            payload: message.encode(),
        };

        if let Err(e) = writer.send_packet(&packet).await {
            return e;
        }
    }
}
