use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{MovieId, SwipeAction, SwipeHistoryEntry, SwipeStats, UserId},
    routes::AppState,
    services::preferences,
};

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub movie_id: MovieId,
    pub action: SwipeAction,
}

/// Records a like or dislike
pub async fn record(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<SwipeRequest>,
) -> AppResult<Json<Value>> {
    preferences::record_swipe(
        state.catalogue.as_ref(),
        state.signals.as_ref(),
        user_id,
        request.movie_id,
        request.action,
    )
    .await?;

    Ok(Json(json!({ "message": "Swipe recorded successfully" })))
}

/// Swipe history, most recent first
pub async fn history(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<SwipeHistoryEntry>>> {
    Ok(Json(state.signals.swipe_history(user_id).await?))
}

pub async fn stats(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<SwipeStats>> {
    Ok(Json(state.signals.swipe_stats(user_id).await?))
}
