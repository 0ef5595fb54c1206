use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::BTreeSet, fmt::Display};

/// Separator used when a genre set is flattened into a single column
pub const GENRE_DELIMITER: &str = ",";

/// TMDB genre ids and their display labels
const TMDB_GENRE_LABELS: &[(&str, &str)] = &[
    ("28", "Action"),
    ("12", "Adventure"),
    ("16", "Animation"),
    ("35", "Comedy"),
    ("80", "Crime"),
    ("99", "Documentary"),
    ("18", "Drama"),
    ("10751", "Family"),
    ("14", "Fantasy"),
    ("36", "History"),
    ("27", "Horror"),
    ("10402", "Music"),
    ("9648", "Mystery"),
    ("10749", "Romance"),
    ("878", "Science Fiction"),
    ("10770", "TV Movie"),
    ("53", "Thriller"),
    ("10752", "War"),
    ("37", "Western"),
];

/// Opaque genre identifier (TMDB numeric ids in practice)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreId(String);

impl GenreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label, falling back to the raw id for unknown genres
    pub fn label(&self) -> Cow<'static, str> {
        TMDB_GENRE_LABELS
            .iter()
            .find(|(id, _)| *id == self.0)
            .map(|(_, label)| Cow::Borrowed(*label))
            .unwrap_or_else(|| Cow::Owned(self.0.clone()))
    }
}

impl From<u32> for GenreId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl Display for GenreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unordered set of genre tags attached to a movie
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreSet(BTreeSet<GenreId>);

impl GenreSet {
    /// Parses the delimited column form (`"28,12,878"`); blank segments are dropped
    pub fn from_delimited(raw: &str) -> Self {
        raw.split(GENRE_DELIMITER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(GenreId::new)
            .collect()
    }

    /// Flattens the set back into the delimited column form
    pub fn to_delimited(&self) -> String {
        self.0
            .iter()
            .map(GenreId::as_str)
            .collect::<Vec<_>>()
            .join(GENRE_DELIMITER)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenreId> {
        self.0.iter()
    }

    pub fn contains(&self, genre: &GenreId) -> bool {
        self.0.contains(genre)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<GenreId> for GenreSet {
    fn from_iter<I: IntoIterator<Item = GenreId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_delimited_parses_ids() {
        let genres = GenreSet::from_delimited("28,12,878");
        assert_eq!(genres.len(), 3);
        assert!(genres.contains(&GenreId::from(878)));
    }

    #[test]
    fn test_from_delimited_is_a_set() {
        let genres = GenreSet::from_delimited("28, 28 ,,12");
        assert_eq!(genres.len(), 2);
    }

    #[test]
    fn test_from_delimited_empty() {
        assert!(GenreSet::from_delimited("").is_empty());
    }

    #[test]
    fn test_to_delimited_is_sorted() {
        let genres = GenreSet::from_delimited("35,18");
        assert_eq!(genres.to_delimited(), "18,35");
    }

    #[test]
    fn test_label_known_genre() {
        assert_eq!(GenreId::from(878).label(), "Science Fiction");
        assert_eq!(GenreId::new("28").label(), "Action");
    }

    #[test]
    fn test_label_unknown_genre_falls_back_to_id() {
        assert_eq!(GenreId::new("4242").label(), "4242");
        assert_eq!(GenreId::new("Noir").label(), "Noir");
    }

    #[test]
    fn test_genre_set_serializes_as_list() {
        let genres = GenreSet::from_delimited("28,12");
        let json = serde_json::to_string(&genres).unwrap();
        assert_eq!(json, r#"["12","28"]"#);
    }
}
