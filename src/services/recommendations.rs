use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::{
    db::{CatalogueStore, PreferenceStore, SignalStore},
    error::AppResult,
    models::{GenreId, GenrePreference, Movie, MovieId, Recommendations, ScoredMovie, UserId},
};

/// Affinity added per genre for each top-10 movie carrying it
pub const TOP_TEN_WEIGHT: u32 = 2;
/// Affinity added per genre for each liked movie carrying it
pub const LIKED_WEIGHT: u32 = 1;
/// Length of the genre breakdown returned with personalized results
pub const TOP_GENRE_COUNT: usize = 5;

const RATING_FACTOR: f64 = 2.0;
const POPULARITY_FACTOR: f64 = 0.5;

/// Per-request genre weights accumulated from a user's top-10 and likes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreAffinity {
    weights: HashMap<GenreId, u32>,
}

impl GenreAffinity {
    /// Builds the map over `top_ten` followed by `liked`.
    ///
    /// The two pools are walked as one concatenated sequence: a movie that is
    /// both in the top-10 and liked is counted once per pool.
    pub fn from_pools(top_ten: &[Movie], liked: &[Movie]) -> Self {
        let mut affinity = Self::default();
        let weighted = top_ten
            .iter()
            .map(|movie| (movie, TOP_TEN_WEIGHT))
            .chain(liked.iter().map(|movie| (movie, LIKED_WEIGHT)));

        for (movie, weight) in weighted {
            for genre in movie.genres.iter() {
                *affinity.weights.entry(genre.clone()).or_insert(0) += weight;
            }
        }

        affinity
    }

    pub fn weight(&self, genre: &GenreId) -> u32 {
        self.weights.get(genre).copied().unwrap_or(0)
    }

    /// Recommendation score of a single movie.
    ///
    /// `sum(affinity of its genres) + rating * 2 + ln(popularity + 1) * 0.5`
    pub fn score(&self, movie: &Movie) -> f64 {
        let genre_score: u32 = movie.genres.iter().map(|genre| self.weight(genre)).sum();

        f64::from(genre_score)
            + movie.rating_or_zero() * RATING_FACTOR
            + (movie.popularity_or_zero() + 1.0).ln() * POPULARITY_FACTOR
    }

    /// The `count` heaviest genres, labelled for display.
    ///
    /// Equal weights are ordered by genre id so repeated calls agree.
    pub fn top_genres(&self, count: usize) -> Vec<GenrePreference> {
        let mut entries: Vec<(&GenreId, u32)> =
            self.weights.iter().map(|(genre, weight)| (genre, *weight)).collect();
        entries.sort_by(|(a_id, a_weight), (b_id, b_weight)| {
            b_weight.cmp(a_weight).then_with(|| a_id.cmp(b_id))
        });

        entries
            .into_iter()
            .take(count)
            .map(|(genre, score)| GenrePreference {
                genre: genre.label().into_owned(),
                score,
            })
            .collect()
    }
}

/// Scores every candidate and keeps the `limit` best, highest score first
///
/// Candidates with equal scores keep no particular order.
pub fn rank_candidates(
    affinity: &GenreAffinity,
    candidates: Vec<Movie>,
    limit: usize,
) -> Vec<ScoredMovie> {
    let mut scored: Vec<(f64, Movie)> = candidates
        .into_iter()
        .map(|movie| (affinity.score(&movie), movie))
        .collect();

    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(score, movie)| ScoredMovie {
            movie,
            recommendation_score: Some(score),
        })
        .collect()
}

/// Builds ranked recommendation feeds from the three stores
///
/// Holds no state between calls; every request re-reads the stores.
#[derive(Clone)]
pub struct Recommender {
    catalogue: Arc<dyn CatalogueStore>,
    preferences: Arc<dyn PreferenceStore>,
    signals: Arc<dyn SignalStore>,
}

impl Recommender {
    pub fn new(
        catalogue: Arc<dyn CatalogueStore>,
        preferences: Arc<dyn PreferenceStore>,
        signals: Arc<dyn SignalStore>,
    ) -> Self {
        Self {
            catalogue,
            preferences,
            signals,
        }
    }

    /// Recommends up to `limit` movies the user has neither swiped nor ranked.
    ///
    /// Users with no top-10 and no likes get the most popular unswiped movies.
    /// Store failures are returned as-is; nothing is retried.
    #[tracing::instrument(skip(self, limit), fields(limit = limit.get()))]
    pub async fn recommend(
        &self,
        user_id: UserId,
        limit: NonZeroUsize,
    ) -> AppResult<Recommendations> {
        let top_ten: Vec<Movie> = self
            .preferences
            .top_ten(user_id)
            .await?
            .into_iter()
            .map(|ranked| ranked.movie)
            .collect();
        let liked = self.signals.liked_movies(user_id).await?;
        let swiped = self.signals.swiped_movie_ids(user_id).await?;

        if top_ten.is_empty() && liked.is_empty() {
            let popular = self
                .catalogue
                .top_by_popularity(&swiped, limit.get())
                .await?;

            tracing::info!(
                swiped = swiped.len(),
                returned = popular.len(),
                "No preference signal, using popularity ranking"
            );

            return Ok(Recommendations::popular(popular));
        }

        let affinity = GenreAffinity::from_pools(&top_ten, &liked);
        let top_ten_ids: HashSet<MovieId> = top_ten.iter().map(|movie| movie.id).collect();
        let candidates = self
            .catalogue
            .catalogue_excluding(&swiped, &top_ten_ids)
            .await?;
        let candidate_count = candidates.len();

        let movies = rank_candidates(&affinity, candidates, limit.get());

        tracing::info!(
            top_ten = top_ten.len(),
            liked = liked.len(),
            candidates = candidate_count,
            returned = movies.len(),
            "Personalized recommendations scored"
        );

        Ok(Recommendations::personalized(
            movies,
            affinity.top_genres(TOP_GENRE_COUNT),
        ))
    }
}
