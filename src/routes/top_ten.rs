use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{MovieId, RankedMovie, UserId},
    routes::AppState,
    services::preferences,
};

#[derive(Debug, Deserialize)]
pub struct SaveTopTenRequest {
    /// Movie ids, favorite first
    pub movies: Vec<MovieId>,
}

/// Returns the user's top-10 in rank order
pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<RankedMovie>>> {
    let top_ten = state.preferences.top_ten(user_id).await?;
    Ok(Json(top_ten))
}

/// Replaces the user's top-10
pub async fn save(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<SaveTopTenRequest>,
) -> AppResult<Json<Value>> {
    preferences::save_top_ten(
        state.catalogue.as_ref(),
        state.preferences.as_ref(),
        user_id,
        request.movies,
    )
    .await?;

    Ok(Json(json!({ "message": "Top 10 saved successfully" })))
}

/// Reports whether the user has a complete top-10
pub async fn status(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Value>> {
    let has_top_ten = preferences::has_top_ten(state.preferences.as_ref(), user_id).await?;
    Ok(Json(json!({ "has_top10": has_top_ten })))
}
