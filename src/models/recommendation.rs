use serde::Serialize;

use super::Movie;

/// Which ranking strategy produced a recommendation list
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Cold start: catalogue ordered by popularity
    Popular,
    /// Genre-affinity scoring from the user's top-10 and likes
    Personalized,
}

/// A catalogue movie with the score it was ranked by
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: Movie,
    /// Absent for popularity-ranked results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_score: Option<f64>,
}

/// One entry of the genre breakdown shown next to personalized results
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenrePreference {
    pub genre: String,
    pub score: u32,
}

/// Response payload of the recommendation endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendations {
    pub movies: Vec<ScoredMovie>,
    pub algorithm: Algorithm,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genre_preferences: Vec<GenrePreference>,
}

impl Recommendations {
    /// Cold-start result: movies in popularity order, no genre breakdown
    pub fn popular(movies: Vec<Movie>) -> Self {
        Self {
            movies: movies
                .into_iter()
                .map(|movie| ScoredMovie {
                    movie,
                    recommendation_score: None,
                })
                .collect(),
            algorithm: Algorithm::Popular,
            genre_preferences: Vec::new(),
        }
    }

    pub fn personalized(movies: Vec<ScoredMovie>, genre_preferences: Vec<GenrePreference>) -> Self {
        Self {
            movies,
            algorithm: Algorithm::Personalized,
            genre_preferences,
        }
    }
}
