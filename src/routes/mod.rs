use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{CatalogueStore, PreferenceStore, SignalStore},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    models::LimitPolicy,
    services::{Recommender, TmdbImporter},
};

pub mod catalogue;
pub mod movies;
pub mod recommendations;
pub mod swipes;
pub mod top_ten;

/// Default number of cards in a swipe deck
const SWIPE_DECK_LIMIT: usize = 50;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalogue: Arc<dyn CatalogueStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub signals: Arc<dyn SignalStore>,
    pub importer: Option<TmdbImporter>,
    pub limits: LimitPolicy,
    pub deck_limits: LimitPolicy,
    pub sample_movies_path: PathBuf,
}

impl AppState {
    /// Builds state around one backend implementing every store contract
    pub fn new<S>(store: Arc<S>, limits: LimitPolicy) -> Self
    where
        S: CatalogueStore + PreferenceStore + SignalStore + 'static,
    {
        let deck_max = limits.max_limit().get().max(SWIPE_DECK_LIMIT);

        Self {
            catalogue: store.clone(),
            preferences: store.clone(),
            signals: store,
            importer: None,
            limits,
            deck_limits: LimitPolicy::new(SWIPE_DECK_LIMIT, deck_max),
            sample_movies_path: PathBuf::from("data/sample_movies.json"),
        }
    }

    pub fn with_importer(mut self, importer: TmdbImporter) -> Self {
        self.importer = Some(importer);
        self
    }

    pub fn with_sample_movies_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sample_movies_path = path.into();
        self
    }

    pub fn recommender(&self) -> Recommender {
        Recommender::new(
            self.catalogue.clone(),
            self.preferences.clone(),
            self.signals.clone(),
        )
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(movies::list))
        .route("/movies/search", get(movies::search))
        .route("/users/:user_id/movies/random", get(movies::random))
        .route(
            "/users/:user_id/recommendations",
            get(recommendations::recommend),
        )
        .route("/users/:user_id/top10", get(top_ten::get).put(top_ten::save))
        .route("/users/:user_id/top10/status", get(top_ten::status))
        .route("/users/:user_id/swipes", post(swipes::record))
        .route("/users/:user_id/swipes/history", get(swipes::history))
        .route("/users/:user_id/swipes/stats", get(swipes::stats))
        .route("/catalogue/import/tmdb", post(catalogue::import_tmdb))
        .route("/catalogue/import/sample", post(catalogue::import_sample))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
