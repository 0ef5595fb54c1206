use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    db::store::{CatalogueStore, PreferenceStore, SignalStore},
    error::AppResult,
    models::{
        Movie, MovieId, RankedMovie, SwipeAction, SwipeHistoryEntry, SwipeStats,
        TopTenSelection, UserId,
    },
};

/// Process-local store implementing every store contract
///
/// All state sits behind one `RwLock`, so a top-10 replace is a single write
/// and readers never see a half-written list.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    movies: BTreeMap<MovieId, Movie>,
    /// Movie ids indexed by rank - 1
    top_ten: HashMap<UserId, Vec<MovieId>>,
    swipes: HashMap<(UserId, MovieId), StoredSwipe>,
    /// Insertion counter breaking timestamp ties in history order
    next_sequence: u64,
}

struct StoredSwipe {
    action: SwipeAction,
    created_at: DateTime<Utc>,
    sequence: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with a catalogue
    pub fn with_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let inner = MemoryStoreInner {
            movies: movies.into_iter().map(|m| (m.id, m)).collect(),
            ..Default::default()
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }
}

/// Popularity descending, id ascending among equals
fn by_popularity(a: &Movie, b: &Movie) -> std::cmp::Ordering {
    b.popularity_or_zero()
        .total_cmp(&a.popularity_or_zero())
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl CatalogueStore for MemoryStore {
    async fn catalogue_excluding(
        &self,
        exclude: &HashSet<MovieId>,
        also_exclude: &HashSet<MovieId>,
    ) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner
            .movies
            .values()
            .filter(|m| !exclude.contains(&m.id) && !also_exclude.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn top_by_popularity(
        &self,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        let mut movies: Vec<Movie> = inner
            .movies
            .values()
            .filter(|m| !exclude.contains(&m.id))
            .cloned()
            .collect();
        movies.sort_by(by_popularity);
        movies.truncate(limit);
        Ok(movies)
    }

    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Movie>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        let mut movies: Vec<Movie> = inner
            .movies
            .values()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        movies.sort_by(by_popularity);
        movies.truncate(limit);
        Ok(movies)
    }

    async fn page(&self, offset: usize, limit: usize) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        let mut movies: Vec<&Movie> = inner.movies.values().collect();
        movies.sort_by(|a, b| by_popularity(a, b));
        Ok(movies
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn random_excluding(
        &self,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        let mut movies: Vec<Movie> = inner
            .movies
            .values()
            .filter(|m| !exclude.contains(&m.id))
            .cloned()
            .collect();
        movies.shuffle(&mut rand::thread_rng());
        movies.truncate(limit);
        Ok(movies)
    }

    async fn existing_ids(&self, ids: &[MovieId]) -> AppResult<HashSet<MovieId>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| inner.movies.contains_key(id))
            .collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.inner.read().await.movies.len() as u64)
    }

    async fn insert_movies(&self, movies: &[Movie]) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let mut inserted = 0;
        for movie in movies {
            if !inner.movies.contains_key(&movie.id) {
                inner.movies.insert(movie.id, movie.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn top_ten(&self, user_id: UserId) -> AppResult<Vec<RankedMovie>> {
        let inner = self.inner.read().await;
        let Some(ids) = inner.top_ten.get(&user_id) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                inner.movies.get(id).map(|movie| RankedMovie {
                    rank: (index + 1) as u8,
                    movie: movie.clone(),
                })
            })
            .collect())
    }

    async fn replace_top_ten(
        &self,
        user_id: UserId,
        selection: &TopTenSelection,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .top_ten
            .insert(user_id, selection.movie_ids().to_vec());
        Ok(())
    }

    async fn top_ten_count(&self, user_id: UserId) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.top_ten.get(&user_id).map_or(0, |ids| ids.len() as u64))
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn liked_movies(&self, user_id: UserId) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner
            .swipes
            .iter()
            .filter(|((user, _), swipe)| *user == user_id && swipe.action == SwipeAction::Like)
            .filter_map(|((_, movie_id), _)| inner.movies.get(movie_id).cloned())
            .collect())
    }

    async fn swiped_movie_ids(&self, user_id: UserId) -> AppResult<HashSet<MovieId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .swipes
            .keys()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, movie_id)| *movie_id)
            .collect())
    }

    async fn upsert_swipe(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        action: SwipeAction,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.swipes.insert(
            (user_id, movie_id),
            StoredSwipe {
                action,
                created_at: Utc::now(),
                sequence,
            },
        );
        Ok(())
    }

    async fn swipe_history(&self, user_id: UserId) -> AppResult<Vec<SwipeHistoryEntry>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<(&StoredSwipe, &Movie)> = inner
            .swipes
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .filter_map(|((_, movie_id), swipe)| inner.movies.get(movie_id).map(|m| (swipe, m)))
            .collect();
        rows.sort_by(|(a, _), (b, _)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });

        Ok(rows
            .into_iter()
            .map(|(swipe, movie)| SwipeHistoryEntry {
                action: swipe.action,
                created_at: swipe.created_at,
                movie: movie.clone(),
            })
            .collect())
    }

    async fn swipe_stats(&self, user_id: UserId) -> AppResult<SwipeStats> {
        let inner = self.inner.read().await;
        let mut stats = SwipeStats::default();
        for swipe in inner
            .swipes
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|(_, swipe)| swipe)
        {
            stats.total += 1;
            match swipe.action {
                SwipeAction::Like => stats.likes += 1,
                SwipeAction::Dislike => stats.dislikes += 1,
            }
        }
        Ok(stats)
    }
}
