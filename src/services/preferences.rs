use std::collections::HashSet;

use crate::{
    db::{CatalogueStore, PreferenceStore, SignalStore},
    error::{AppError, AppResult},
    models::{MovieId, SwipeAction, TopTenSelection, UserId, TOP_TEN_SIZE},
};

/// Validates and stores a user's new top-10, replacing the old one whole
pub async fn save_top_ten(
    catalogue: &dyn CatalogueStore,
    preferences: &dyn PreferenceStore,
    user_id: UserId,
    movie_ids: Vec<MovieId>,
) -> AppResult<()> {
    let selection = TopTenSelection::new(movie_ids)?;

    let known = catalogue.existing_ids(selection.movie_ids()).await?;
    let unknown: Vec<MovieId> = selection
        .movie_ids()
        .iter()
        .copied()
        .filter(|id| !known.contains(id))
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Unknown movies in top 10: {:?}",
            unknown
        )));
    }

    preferences.replace_top_ten(user_id, &selection).await?;

    tracing::info!(user_id, "Top 10 saved");
    Ok(())
}

/// Whether the user has a complete top-10
pub async fn has_top_ten(preferences: &dyn PreferenceStore, user_id: UserId) -> AppResult<bool> {
    let count = preferences.top_ten_count(user_id).await?;
    Ok(count == TOP_TEN_SIZE as u64)
}

/// Records a like/dislike, replacing any earlier swipe on the same movie
pub async fn record_swipe(
    catalogue: &dyn CatalogueStore,
    signals: &dyn SignalStore,
    user_id: UserId,
    movie_id: MovieId,
    action: SwipeAction,
) -> AppResult<()> {
    let known: HashSet<MovieId> = catalogue.existing_ids(&[movie_id]).await?;
    if !known.contains(&movie_id) {
        return Err(AppError::NotFound(format!("Movie {}", movie_id)));
    }

    signals.upsert_swipe(user_id, movie_id, action).await?;

    tracing::debug!(user_id, movie_id, action = %action, "Swipe recorded");
    Ok(())
}
