use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::Settings;
use crate::handles::*;
use crate::services::{
    BroadcastObserver, ChannelAnnouncer, MoteBridge, Oscilloscope, ResultLog, ServiceEvent,
};

pub async fn create_app(settings: &Arc<Settings>) -> Router {
    let (sender, _receiver) = broadcast::channel(100);
    let (announcer, outbox) = ChannelAnnouncer::new();
    let connected = announcer.connection_flag();

    // An unwritable result log only disables result logging
    let result_log = match &settings.result_log.path {
        Some(path) => match ResultLog::open(path).await {
            Ok((log, _writer)) => log,
            Err(e) => {
                tracing::error!("{:#}, results will not be written", anyhow::Error::from(e));
                ResultLog::disabled()
            }
        },
        None => ResultLog::disabled(),
    };

    let scope = Arc::new(Oscilloscope::new(
        settings.session.default_interval,
        Arc::new(BroadcastObserver::new(sender.clone())),
        Arc::new(announcer),
        result_log,
    ));

    let bridge = MoteBridge::new(settings.bridge.clone(), scope.clone(), connected);
    tokio::spawn(bridge.run(outbox));

    create_router(scope, sender)
}

/// Operator API over an existing oscilloscope
pub fn create_router(scope: Arc<Oscilloscope>, sender: broadcast::Sender<ServiceEvent>) -> Router {
    let session = Router::new()
        .route("/", get(get_session))
        .route("/interval", put(update_interval))
        .with_state(SessionState {
            scope: scope.clone(),
        });

    let motes = Router::new()
        .route("/", get(get_motes).delete(clear_motes))
        .route("/:mote_id", get(get_mote))
        .route("/:mote_id/samples/:index", get(get_sample))
        .route("/:mote_id/series", get(get_series))
        .with_state(MoteState {
            scope: scope.clone(),
        });

    let sse = Router::new()
        .route("/", get(sse_handler))
        .with_state(SSEState { sender });

    Router::new()
        .nest("/session", session)
        .nest("/motes", motes)
        .nest("/event", sse)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
