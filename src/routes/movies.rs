use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{Movie, UserId},
    routes::AppState,
    services::catalogue::{self, MoviePage},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeckQuery {
    limit: Option<String>,
}

/// Handler for title search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = catalogue::search(state.catalogue.as_ref(), &params.q).await?;
    Ok(Json(movies))
}

/// Paginated catalogue listing
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<MoviePage>> {
    let page = catalogue::parse_page(params.page.as_deref());
    let limit = state.limits.resolve(params.limit.as_deref());

    let page = catalogue::list_page(state.catalogue.as_ref(), page, limit).await?;
    Ok(Json(page))
}

/// Random unswiped movies for the swipe deck
pub async fn random(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<DeckQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let limit = state.deck_limits.resolve(params.limit.as_deref());

    let movies = catalogue::swipe_deck(
        state.catalogue.as_ref(),
        state.signals.as_ref(),
        user_id,
        limit,
    )
    .await?;
    Ok(Json(movies))
}
