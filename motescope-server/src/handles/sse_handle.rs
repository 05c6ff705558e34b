use std::convert::Infallible;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use tokio::sync::broadcast::Sender;
use tokio_stream::{Stream, StreamExt, wrappers};

use crate::services::ServiceEvent;

#[derive(Clone)]
pub struct SSEState {
    pub sender: Sender<ServiceEvent>,
}

pub async fn sse_handler(
    State(state): State<SSEState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.sender.subscribe();

    // Lagged receivers skip what they missed
    let stream = wrappers::BroadcastStream::new(receiver).filter_map(|result| {
        let event = result.ok()?;

        match Event::default().json_data(&event) {
            Ok(event) => Some(Ok::<_, Infallible>(event)),
            Err(e) => {
                tracing::error!("failed to encode display event: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
