//! Catalogue import
//!
//! Fills an empty catalogue either from TMDB's popular-movies listing or from a
//! bundled JSON sample. Both imports are skipped once the catalogue has rows.

use chrono::{Datelike, NaiveDate};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    db::CatalogueStore,
    error::{AppError, AppResult},
    models::{GenreId, GenreSet, Movie, MovieId},
};

/// Number of `movie/popular` pages fetched per import
const POPULAR_PAGES: u32 = 5;
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Outcome of an import request
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub message: String,
    pub count: u64,
}

/// One result of TMDB's `movie/popular` listing
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
}

impl From<TmdbMovie> for Movie {
    fn from(tmdb: TmdbMovie) -> Self {
        let year = tmdb
            .release_date
            .as_deref()
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .map(|date| date.year());

        Movie {
            id: tmdb.id,
            title: tmdb.title,
            year,
            genres: tmdb.genre_ids.into_iter().map(GenreId::from).collect(),
            poster: tmdb
                .poster_path
                .map(|path| format!("{}{}", POSTER_BASE_URL, path)),
            description: tmdb.overview.filter(|text| !text.is_empty()),
            rating: Some(tmdb.vote_average.unwrap_or(0.0)),
            popularity: Some(tmdb.popularity.unwrap_or(0.0)),
            vote_count: tmdb.vote_count.unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
struct PopularResponse {
    results: Vec<TmdbMovie>,
}

/// Movie record as stored in the sample JSON file (genres comma-delimited)
#[derive(Debug, Clone, Deserialize)]
pub struct SampleMovie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
}

impl From<SampleMovie> for Movie {
    fn from(sample: SampleMovie) -> Self {
        Movie {
            id: sample.id,
            title: sample.title,
            year: sample.year,
            genres: sample
                .genres
                .as_deref()
                .map(GenreSet::from_delimited)
                .unwrap_or_default(),
            poster: sample.poster,
            description: sample.description,
            rating: sample.rating,
            popularity: sample.popularity,
            vote_count: sample.vote_count.unwrap_or(0),
        }
    }
}

/// TMDB client used to seed the catalogue
#[derive(Clone)]
pub struct TmdbImporter {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbImporter {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    /// Fetches a single page of popular movies
    async fn fetch_popular_page(&self, page: u32) -> AppResult<Vec<TmdbMovie>> {
        let url = format!("{}/movie/popular", self.api_url);
        let page = page.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("page", page.as_str()),
                ("language", "en-US"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let popular: PopularResponse = response.json().await?;
        Ok(popular.results)
    }

    /// Fetches every popular page; failed pages are logged and skipped
    pub async fn fetch_popular(&self) -> Vec<Movie> {
        let mut movies = Vec::new();

        for page in 1..=POPULAR_PAGES {
            match self.fetch_popular_page(page).await {
                Ok(results) => movies.extend(results.into_iter().map(Movie::from)),
                Err(e) => tracing::error!(page, error = %e, "Failed to fetch TMDB page"),
            }
        }

        movies
    }
}

/// Returns a summary when the catalogue already has movies
async fn already_populated(catalogue: &dyn CatalogueStore) -> AppResult<Option<ImportSummary>> {
    let count = catalogue.count().await?;
    if count == 0 {
        return Ok(None);
    }

    Ok(Some(ImportSummary {
        message: "Movies already populated".to_string(),
        count,
    }))
}

/// Seeds the catalogue from TMDB's popular listing
pub async fn import_from_tmdb(
    catalogue: &dyn CatalogueStore,
    importer: &TmdbImporter,
) -> AppResult<ImportSummary> {
    if let Some(summary) = already_populated(catalogue).await? {
        return Ok(summary);
    }

    let movies = importer.fetch_popular().await;
    if movies.is_empty() {
        return Err(AppError::ExternalApi(
            "TMDB returned no movies".to_string(),
        ));
    }

    let count = catalogue.insert_movies(&movies).await?;
    tracing::info!(fetched = movies.len(), inserted = count, "Catalogue populated from TMDB");

    Ok(ImportSummary {
        message: "Movies populated successfully".to_string(),
        count,
    })
}

/// Seeds the catalogue from a JSON array of sample movies
pub async fn import_sample(
    catalogue: &dyn CatalogueStore,
    path: &Path,
) -> AppResult<ImportSummary> {
    if let Some(summary) = already_populated(catalogue).await? {
        return Ok(summary);
    }

    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Internal(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let samples: Vec<SampleMovie> = serde_json::from_str(&raw).map_err(|e| {
        AppError::Internal(format!("Invalid sample movie file {}: {}", path.display(), e))
    })?;
    let movies: Vec<Movie> = samples.into_iter().map(Movie::from).collect();

    let count = catalogue.insert_movies(&movies).await?;
    tracing::info!(inserted = count, path = %path.display(), "Catalogue populated from sample file");

    Ok(ImportSummary {
        message: "Sample movies populated successfully".to_string(),
        count,
    })
}
