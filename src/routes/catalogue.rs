use axum::{extract::State, Json};

use crate::{
    error::{AppError, AppResult},
    routes::AppState,
    services::catalogue_import::{self, ImportSummary},
};

/// Seeds an empty catalogue from TMDB
pub async fn import_tmdb(State(state): State<AppState>) -> AppResult<Json<ImportSummary>> {
    let importer = state.importer.as_ref().ok_or_else(|| {
        AppError::InvalidInput("TMDB import is not configured (set TMDB_API_KEY)".to_string())
    })?;

    let summary = catalogue_import::import_from_tmdb(state.catalogue.as_ref(), importer).await?;
    Ok(Json(summary))
}

/// Seeds an empty catalogue from the bundled sample file
pub async fn import_sample(State(state): State<AppState>) -> AppResult<Json<ImportSummary>> {
    let summary =
        catalogue_import::import_sample(state.catalogue.as_ref(), &state.sample_movies_path)
            .await?;
    Ok(Json(summary))
}
