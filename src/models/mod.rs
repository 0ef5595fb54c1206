use serde::{Deserialize, Serialize};

pub mod genre;
pub mod limit;
pub mod recommendation;
pub mod swipe;
pub mod top_ten;

pub use genre::{GenreId, GenreSet};
pub use limit::LimitPolicy;
pub use recommendation::{Algorithm, GenrePreference, Recommendations, ScoredMovie};
pub use swipe::{SwipeAction, SwipeHistoryEntry, SwipeStats};
pub use top_ten::{RankedMovie, TopTenSelection, TOP_TEN_SIZE};

/// Catalogue identifier of a movie (TMDB id)
pub type MovieId = i64;

/// Identifier of a user, owned by the external user service
pub type UserId = i64;

/// A catalogue movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: GenreSet,
    pub poster: Option<String>,
    pub description: Option<String>,
    /// Average rating on a 0-10 scale
    pub rating: Option<f64>,
    /// Unbounded popularity index
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_count: i64,
}

impl Movie {
    /// Rating with missing or non-finite values read as zero
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.filter(|r| r.is_finite()).unwrap_or(0.0)
    }

    /// Popularity coerced to a non-negative finite number
    pub fn popularity_or_zero(&self) -> f64 {
        self.popularity
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(0.0)
    }
}
