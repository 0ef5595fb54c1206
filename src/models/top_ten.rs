use serde::Serialize;
use std::collections::HashSet;

use super::{Movie, MovieId};
use crate::error::{AppError, AppResult};

/// Number of entries in a complete top-10 list
pub const TOP_TEN_SIZE: usize = 10;

/// A movie in a user's top-10 together with its rank (1 = favorite)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedMovie {
    pub rank: u8,
    #[serde(flatten)]
    pub movie: Movie,
}

/// A validated top-10 submission: exactly ten distinct movies, favorite first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopTenSelection(Vec<MovieId>);

impl TopTenSelection {
    pub fn new(movie_ids: Vec<MovieId>) -> AppResult<Self> {
        if movie_ids.len() != TOP_TEN_SIZE {
            return Err(AppError::InvalidInput(format!(
                "Must provide exactly {} movies",
                TOP_TEN_SIZE
            )));
        }

        let mut seen = HashSet::with_capacity(TOP_TEN_SIZE);
        if let Some(duplicate) = movie_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(AppError::InvalidInput(format!(
                "Movie {} appears more than once",
                duplicate
            )));
        }

        Ok(Self(movie_ids))
    }

    pub fn movie_ids(&self) -> &[MovieId] {
        &self.0
    }

    /// (rank, movie id) pairs with ranks 1 through 10 in submission order
    pub fn ranked(&self) -> impl Iterator<Item = (u8, MovieId)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(index, id)| ((index + 1) as u8, *id))
    }
}
