mod models;
mod handlers;
mod services;
mod middleware;
mod config;
mod errors;
mod routes;
mod state;
mod views;

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::{
    config::{Config, StorageBackend},
    services::{DocumentStore, InMemoryStore, RedisStore},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "axum_tasks=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // The one persistence handle both stores share
    let store: Arc<dyn DocumentStore> = match config.database.backend {
        StorageBackend::Redis => {
            let client = redis::Client::open(config.database.url.as_str())
                .context("Invalid Redis URL")?;
            tracing::info!("Using Redis document store at {}", config.database.url);
            Arc::new(RedisStore::new(Arc::new(client), config.database.key_prefix.clone()))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let seed = config.seed.clone();
    let state = AppState::new(store, config);

    if seed.enabled {
        let user = state
            .credentials
            .seed(&seed.username, &seed.password)
            .await
            .context("Failed to seed users")?;
        tracing::info!("Seeded user {}", user.username);
    }

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
