use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use whatsyourmovie_api::{
    config::{Config, StorageBackend},
    db::{self, MemoryStore, PgStore},
    models::LimitPolicy,
    routes::{create_router, AppState},
    services::TmdbImporter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whatsyourmovie_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let limits = LimitPolicy::new(config.default_limit, config.max_limit);

    let state = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Connected to PostgreSQL and applied migrations");
            AppState::new(Arc::new(PgStore::new(pool)), limits)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            AppState::new(Arc::new(MemoryStore::new()), limits)
        }
    };

    let state = match config.tmdb_api_key.clone() {
        Some(api_key) => {
            state.with_importer(TmdbImporter::new(api_key, config.tmdb_api_url.clone()))
        }
        None => {
            tracing::info!("TMDB_API_KEY not set, TMDB catalogue import disabled");
            state
        }
    }
    .with_sample_movies_path(&config.sample_movies_path);

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
