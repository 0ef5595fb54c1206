//! Store contracts
//!
//! The recommendation scorer only reads through these traits; the write paths
//! (top-10 replace, swipe upsert, catalogue inserts) live on the same traits so
//! that one backend owns the atomicity of its own writes.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{
        Movie, MovieId, RankedMovie, SwipeAction, SwipeHistoryEntry, SwipeStats,
        TopTenSelection, UserId,
    },
};

/// Movie metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueStore: Send + Sync {
    /// Every catalogue movie whose id is in neither exclusion set
    async fn catalogue_excluding(
        &self,
        exclude: &HashSet<MovieId>,
        also_exclude: &HashSet<MovieId>,
    ) -> AppResult<Vec<Movie>>;

    /// Up to `limit` movies outside `exclude`, most popular first
    async fn top_by_popularity(
        &self,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<Movie>>;

    /// Case-insensitive title substring search, most popular first
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Movie>>;

    /// One page of the catalogue in popularity order
    async fn page(&self, offset: usize, limit: usize) -> AppResult<Vec<Movie>>;

    /// Up to `limit` movies outside `exclude`, in random order
    async fn random_excluding(
        &self,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<Movie>>;

    /// Subset of `ids` present in the catalogue
    async fn existing_ids(&self, ids: &[MovieId]) -> AppResult<HashSet<MovieId>>;

    async fn count(&self) -> AppResult<u64>;

    /// Inserts movies, ignoring ids that already exist; returns how many were added
    async fn insert_movies(&self, movies: &[Movie]) -> AppResult<u64>;
}

/// Users' ranked top-10 lists
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// The user's top-10 ordered by rank ascending; empty or exactly ten entries
    async fn top_ten(&self, user_id: UserId) -> AppResult<Vec<RankedMovie>>;

    /// Atomically replaces the user's whole top-10
    async fn replace_top_ten(&self, user_id: UserId, selection: &TopTenSelection)
        -> AppResult<()>;

    async fn top_ten_count(&self, user_id: UserId) -> AppResult<u64>;
}

/// Users' like/dislike swipes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Movies the user swiped `like` on, in no particular order
    async fn liked_movies(&self, user_id: UserId) -> AppResult<Vec<Movie>>;

    /// Ids of every movie the user swiped on, either direction
    async fn swiped_movie_ids(&self, user_id: UserId) -> AppResult<HashSet<MovieId>>;

    /// Records a swipe, replacing any earlier swipe on the same movie
    async fn upsert_swipe(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        action: SwipeAction,
    ) -> AppResult<()>;

    /// Swipes joined with their movies, most recent first
    async fn swipe_history(&self, user_id: UserId) -> AppResult<Vec<SwipeHistoryEntry>>;

    async fn swipe_stats(&self, user_id: UserId) -> AppResult<SwipeStats>;
}
