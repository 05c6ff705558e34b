use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use motescope_api::message::{ControlMsg, MoteMessage, SampleMsg};
use motescope_server::app::create_router;
use motescope_server::errors::AnnounceError;
use motescope_server::services::{
    Announcer, BroadcastObserver, Oscilloscope, ResultLog, ServiceEvent,
};
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;

/// Captures announcements instead of putting them on a mote link
#[derive(Default)]
pub struct RecordingAnnouncer {
    pub sent: Mutex<Vec<ControlMsg>>,
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, msg: ControlMsg) -> Result<(), AnnounceError> {
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}

pub struct MockApp {
    pub router: Router,
    pub scope: Arc<Oscilloscope>,
    pub announcer: Arc<RecordingAnnouncer>,
    pub events: broadcast::Receiver<ServiceEvent>,
}

impl MockApp {
    pub fn new() -> Self {
        let (sender, events) = broadcast::channel(100);
        let announcer = Arc::new(RecordingAnnouncer::default());

        let scope = Arc::new(Oscilloscope::new(
            100,
            Arc::new(BroadcastObserver::new(sender.clone())),
            announcer.clone(),
            ResultLog::disabled(),
        ));

        Self {
            router: create_router(scope.clone(), sender),
            scope,
            announcer,
            events,
        }
    }

    /// Feeds a sample as if it came over the mote link
    pub async fn receive_sample(&self, node_id: u8, version: u16, interval: u16, time: u16, light: Option<u16>) {
        let message = MoteMessage::Sample(SampleMsg {
            node_id,
            version,
            interval,
            time,
            temperature: Some(2500),
            humidity: None,
            light,
        });

        self.scope.message_received(u16::from(node_id), message).await;
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
