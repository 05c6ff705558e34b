use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use motescope_api::message::MoteId;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::Channel;
use crate::services::{MoteSummary, Oscilloscope};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelQuery {
    pub channel: Channel,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeriesQuery {
    pub channel: Channel,
    pub from: Option<usize>,
    pub to: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleBody {
    pub id: MoteId,
    pub index: usize,
    pub channel: Channel,
    /// `null` when the slot holds no reading
    pub value: Option<u16>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeriesBody {
    pub id: MoteId,
    pub channel: Channel,
    pub from: usize,
    pub values: Vec<Option<u16>>,
}

#[derive(Clone)]
pub struct MoteState {
    pub scope: Arc<Oscilloscope>,
}

pub async fn get_motes(State(state): State<MoteState>) -> impl IntoResponse {
    Json(state.scope.summaries().await)
}

pub async fn clear_motes(State(state): State<MoteState>) -> impl IntoResponse {
    state.scope.clear().await;

    StatusCode::NO_CONTENT
}

pub async fn get_mote(
    Path(mote_id): Path<MoteId>,
    State(state): State<MoteState>,
) -> impl IntoResponse {
    Json(MoteSummary {
        id: mote_id,
        max_index: state.scope.max_index(mote_id).await,
    })
}

pub async fn get_sample(
    Path((mote_id, index)): Path<(MoteId, usize)>,
    Query(query): Query<ChannelQuery>,
    State(state): State<MoteState>,
) -> impl IntoResponse {
    let value = state.scope.sample(mote_id, index, query.channel).await;

    Json(SampleBody {
        id: mote_id,
        index,
        channel: query.channel,
        value,
    })
}

pub async fn get_series(
    Path(mote_id): Path<MoteId>,
    Query(query): Query<SeriesQuery>,
    State(state): State<MoteState>,
) -> Result<impl IntoResponse, ApiError> {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err(ApiError::InvalidRange { from, to });
    }

    let values = state.scope.series(mote_id, query.channel, from..to).await;

    Ok(Json(SeriesBody {
        id: mote_id,
        channel: query.channel,
        from,
        values,
    }))
}
