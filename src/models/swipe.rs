use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::Movie;

/// Direction of a swipe on a movie card
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Dislike,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Dislike => "dislike",
        }
    }
}

impl Display for SwipeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SwipeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SwipeAction::Like),
            "dislike" => Ok(SwipeAction::Dislike),
            other => Err(format!("unknown swipe action '{}'", other)),
        }
    }
}

/// A recorded swipe joined with the movie it refers to
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwipeHistoryEntry {
    pub action: SwipeAction,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub movie: Movie,
}

/// Per-user swipe counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwipeStats {
    pub total: u64,
    pub likes: u64,
    pub dislikes: u64,
}
