use serde::Serialize;
use std::num::NonZeroUsize;

use crate::{
    db::{CatalogueStore, SignalStore},
    error::{AppError, AppResult},
    models::{Movie, UserId},
};

/// Maximum number of rows a title search returns
pub const SEARCH_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub pagination: Pagination,
}

/// Parses a 1-based page number, falling back to the first page
pub fn parse_page(raw: Option<&str>) -> NonZeroUsize {
    raw.and_then(|s| s.trim().parse::<NonZeroUsize>().ok())
        .unwrap_or(NonZeroUsize::MIN)
}

/// Title search; a blank query is rejected
pub async fn search(catalogue: &dyn CatalogueStore, query: &str) -> AppResult<Vec<Movie>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Search query required".to_string()));
    }

    catalogue.search(query, SEARCH_LIMIT).await
}

/// One popularity-ordered page of the catalogue
pub async fn list_page(
    catalogue: &dyn CatalogueStore,
    page: NonZeroUsize,
    limit: NonZeroUsize,
) -> AppResult<MoviePage> {
    let offset = (page.get() - 1).saturating_mul(limit.get());
    let movies = catalogue.page(offset, limit.get()).await?;
    let total = catalogue.count().await?;

    Ok(MoviePage {
        movies,
        pagination: Pagination {
            page: page.get(),
            limit: limit.get(),
            total,
            pages: total.div_ceil(limit.get() as u64),
        },
    })
}

/// Random movies the user has not swiped yet, for the swipe deck
pub async fn swipe_deck(
    catalogue: &dyn CatalogueStore,
    signals: &dyn SignalStore,
    user_id: UserId,
    limit: NonZeroUsize,
) -> AppResult<Vec<Movie>> {
    let swiped = signals.swiped_movie_ids(user_id).await?;
    catalogue.random_excluding(&swiped, limit.get()).await
}
