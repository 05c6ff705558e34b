use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::services::Oscilloscope;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntervalBody {
    pub interval: i64,
}

#[derive(Clone)]
pub struct SessionState {
    pub scope: Arc<Oscilloscope>,
}

pub async fn get_session(State(state): State<SessionState>) -> impl IntoResponse {
    Json(state.scope.session().await)
}

pub async fn update_interval(
    State(state): State<SessionState>,
    Json(body): Json<IntervalBody>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.scope.set_interval(body.interval).await?;

    Ok(Json(snapshot))
}
