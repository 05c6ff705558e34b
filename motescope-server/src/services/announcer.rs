use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use motescope_api::message::ControlMsg;
use tokio::sync::mpsc;

use crate::errors::AnnounceError;

/// Outbound side of the mote link. Must not block: the coordinator calls it
/// while holding its state lock.
pub trait Announcer: Send + Sync {
    fn announce(&self, msg: ControlMsg) -> Result<(), AnnounceError>;
}

/// Queues announcements for the bridge task to put on the wire
#[derive(Clone)]
pub struct ChannelAnnouncer {
    sender: mpsc::UnboundedSender<ControlMsg>,
    connected: Arc<AtomicBool>,
}

impl ChannelAnnouncer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ControlMsg>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let announcer = Self {
            sender,
            connected: Arc::new(AtomicBool::new(false)),
        };

        (announcer, receiver)
    }

    /// Flag the bridge raises while a forwarder session is up
    pub fn connection_flag(&self) -> Arc<AtomicBool> {
        self.connected.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Announcer for ChannelAnnouncer {
    fn announce(&self, msg: ControlMsg) -> Result<(), AnnounceError> {
        if !self.is_connected() {
            return Err(AnnounceError::NotConnected);
        }

        self.sender.send(msg).map_err(|_| AnnounceError::Closed)
    }
}
