use motescope_api::message::MoteId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;

/// Something the display layer should react to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayEvent {
    /// First sample from a previously unknown mote
    NewMote { mote_id: MoteId },
    /// A sample was stored at `index`
    NewData { mote_id: MoteId, index: usize },
    /// The sampling interval was taken over from a mote or the operator
    IntervalChanged { version: u16, interval: u16 },
    Cleared,
    /// Non-fatal problem the operator should see
    Warning { message: String },
}

/// Display layer seen from the core. Called while the state lock may be
/// held, so implementations must not block.
pub trait DisplayObserver: Send + Sync {
    fn notify(&self, event: DisplayEvent);
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceEvent {
    #[serde(flatten)]
    pub event: DisplayEvent,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Fans display events out to every connected event stream
#[derive(Clone)]
pub struct BroadcastObserver {
    sender: broadcast::Sender<ServiceEvent>,
}

impl BroadcastObserver {
    pub fn new(sender: broadcast::Sender<ServiceEvent>) -> Self {
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.sender.subscribe()
    }
}

impl DisplayObserver for BroadcastObserver {
    fn notify(&self, event: DisplayEvent) {
        let event = ServiceEvent {
            event,
            timestamp: OffsetDateTime::now_utc(),
        };

        // No subscriber simply means nobody is watching
        if self.sender.send(event).is_err() {
            tracing::trace!("display event dropped, no subscribers");
        }
    }
}
