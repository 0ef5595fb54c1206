use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Recommendations, UserId},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    /// Kept as text so malformed values fall back to the default instead of failing
    pub limit: Option<String>,
}

/// Handler for the recommendation feed
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Recommendations>> {
    let limit = state.limits.resolve(query.limit.as_deref());

    tracing::info!(
        request_id = %request_id,
        user_id,
        limit = limit.get(),
        "Processing recommendation request"
    );

    let recommendations = state.recommender().recommend(user_id, limit).await?;

    tracing::info!(
        request_id = %request_id,
        algorithm = ?recommendations.algorithm,
        count = recommendations.movies.len(),
        "Recommendations completed"
    );

    Ok(Json(recommendations))
}
