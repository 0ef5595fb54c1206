use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use std::collections::HashSet;

use crate::{
    db::store::{CatalogueStore, PreferenceStore, SignalStore},
    error::{AppError, AppResult},
    models::{
        GenreSet, Movie, MovieId, RankedMovie, SwipeAction, SwipeHistoryEntry, SwipeStats,
        TopTenSelection, UserId,
    },
};

const MOVIE_COLUMNS: &str =
    "m.id, m.title, m.year, m.genres, m.poster, m.description, m.rating, m.popularity, m.vote_count";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the schema in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Row shape of the `movies` table; genres are stored comma-delimited
#[derive(Debug, FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    year: Option<i32>,
    genres: Option<String>,
    poster: Option<String>,
    description: Option<String>,
    rating: Option<f64>,
    popularity: Option<f64>,
    vote_count: Option<i64>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            year: row.year,
            genres: row
                .genres
                .as_deref()
                .map(GenreSet::from_delimited)
                .unwrap_or_default(),
            poster: row.poster,
            description: row.description,
            rating: row.rating,
            popularity: row.popularity,
            vote_count: row.vote_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, FromRow)]
struct RankedMovieRow {
    rank: i32,
    #[sqlx(flatten)]
    movie: MovieRow,
}

#[derive(Debug, FromRow)]
struct SwipeHistoryRow {
    action: String,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    movie: MovieRow,
}

impl TryFrom<SwipeHistoryRow> for SwipeHistoryEntry {
    type Error = AppError;

    fn try_from(row: SwipeHistoryRow) -> AppResult<Self> {
        let action = row.action.parse().map_err(AppError::Internal)?;
        Ok(SwipeHistoryEntry {
            action,
            created_at: row.created_at,
            movie: row.movie.into(),
        })
    }
}

#[derive(Debug, FromRow)]
struct SwipeStatsRow {
    total: i64,
    likes: i64,
    dislikes: i64,
}

fn to_id_vec<'a>(ids: impl IntoIterator<Item = &'a MovieId>) -> Vec<MovieId> {
    ids.into_iter().copied().collect()
}

/// Escapes LIKE wildcards so user input matches literally
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// PostgreSQL-backed implementation of every store contract
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogueStore for PgStore {
    async fn catalogue_excluding(
        &self,
        exclude: &HashSet<MovieId>,
        also_exclude: &HashSet<MovieId>,
    ) -> AppResult<Vec<Movie>> {
        let excluded = to_id_vec(exclude.iter().chain(also_exclude.iter()));

        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies m WHERE NOT (m.id = ANY($1))",
            MOVIE_COLUMNS
        ))
        .bind(&excluded)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn top_by_popularity(
        &self,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies m WHERE NOT (m.id = ANY($1)) \
             ORDER BY m.popularity DESC NULLS LAST, m.id LIMIT $2",
            MOVIE_COLUMNS
        ))
        .bind(to_id_vec(exclude))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies m WHERE m.title ILIKE $1 \
             ORDER BY m.popularity DESC NULLS LAST, m.id LIMIT $2",
            MOVIE_COLUMNS
        ))
        .bind(like_pattern(query))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn page(&self, offset: usize, limit: usize) -> AppResult<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies m \
             ORDER BY m.popularity DESC NULLS LAST, m.id LIMIT $1 OFFSET $2",
            MOVIE_COLUMNS
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn random_excluding(
        &self,
        exclude: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies m WHERE NOT (m.id = ANY($1)) ORDER BY RANDOM() LIMIT $2",
            MOVIE_COLUMNS
        ))
        .bind(to_id_vec(exclude))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn existing_ids(&self, ids: &[MovieId]) -> AppResult<HashSet<MovieId>> {
        let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM movies WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(found.into_iter().collect())
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn insert_movies(&self, movies: &[Movie]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for movie in movies {
            let result = sqlx::query(
                r#"
                INSERT INTO movies (id, title, year, genres, poster, description, rating, popularity, vote_count)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(movie.id)
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.genres.to_delimited())
            .bind(&movie.poster)
            .bind(&movie.description)
            .bind(movie.rating)
            .bind(movie.popularity)
            .bind(movie.vote_count)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

#[async_trait]
impl PreferenceStore for PgStore {
    async fn top_ten(&self, user_id: UserId) -> AppResult<Vec<RankedMovie>> {
        let rows: Vec<RankedMovieRow> = sqlx::query_as(&format!(
            "SELECT t.rank, {} FROM user_top10 t \
             JOIN movies m ON t.movie_id = m.id \
             WHERE t.user_id = $1 ORDER BY t.rank",
            MOVIE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RankedMovie {
                rank: row.rank as u8,
                movie: row.movie.into(),
            })
            .collect())
    }

    async fn replace_top_ten(
        &self,
        user_id: UserId,
        selection: &TopTenSelection,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_top10 WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (rank, movie_id) in selection.ranked() {
            sqlx::query("INSERT INTO user_top10 (user_id, movie_id, rank) VALUES ($1, $2, $3)")
                .bind(user_id)
                .bind(movie_id)
                .bind(i32::from(rank))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn top_ten_count(&self, user_id: UserId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_top10 WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl SignalStore for PgStore {
    async fn liked_movies(&self, user_id: UserId) -> AppResult<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM swipes s JOIN movies m ON s.movie_id = m.id \
             WHERE s.user_id = $1 AND s.action = 'like'",
            MOVIE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn swiped_movie_ids(&self, user_id: UserId) -> AppResult<HashSet<MovieId>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT movie_id FROM swipes WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn upsert_swipe(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        action: SwipeAction,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO swipes (user_id, movie_id, action, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, movie_id)
            DO UPDATE SET action = EXCLUDED.action, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(action.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn swipe_history(&self, user_id: UserId) -> AppResult<Vec<SwipeHistoryEntry>> {
        let rows: Vec<SwipeHistoryRow> = sqlx::query_as(&format!(
            "SELECT s.action, s.created_at, {} FROM swipes s \
             JOIN movies m ON s.movie_id = m.id \
             WHERE s.user_id = $1 ORDER BY s.created_at DESC, s.id DESC",
            MOVIE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SwipeHistoryEntry::try_from).collect()
    }

    async fn swipe_stats(&self, user_id: UserId) -> AppResult<SwipeStats> {
        let row: SwipeStatsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE action = 'like') AS likes,
                COUNT(*) FILTER (WHERE action = 'dislike') AS dislikes
            FROM swipes
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SwipeStats {
            total: row.total.max(0) as u64,
            likes: row.likes.max(0) as u64,
            dislikes: row.dislikes.max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_row_decodes_delimited_genres() {
        let row = MovieRow {
            id: 603,
            title: "The Matrix".to_string(),
            year: Some(1999),
            genres: Some("28,878".to_string()),
            poster: None,
            description: None,
            rating: Some(8.2),
            popularity: None,
            vote_count: None,
        };

        let movie = Movie::from(row);
        assert_eq!(movie.genres, GenreSet::from_delimited("878,28"));
        assert_eq!(movie.vote_count, 0);
    }

    #[test]
    fn test_movie_row_without_genres() {
        let row = MovieRow {
            id: 1,
            title: "Untitled".to_string(),
            year: None,
            genres: None,
            poster: None,
            description: None,
            rating: None,
            popularity: None,
            vote_count: Some(4),
        };

        assert!(Movie::from(row).genres.is_empty());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("matrix"), "%matrix%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
    }

    #[test]
    fn test_history_row_rejects_unknown_action() {
        let row = SwipeHistoryRow {
            action: "superlike".to_string(),
            created_at: Utc::now(),
            movie: MovieRow {
                id: 1,
                title: "Untitled".to_string(),
                year: None,
                genres: None,
                poster: None,
                description: None,
                rating: None,
                popularity: None,
                vote_count: None,
            },
        };

        assert!(matches!(
            SwipeHistoryEntry::try_from(row),
            Err(AppError::Internal(_))
        ));
    }
}
