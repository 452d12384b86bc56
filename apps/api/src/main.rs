mod cache;
mod config;
mod db;
mod errors;
mod models;
mod paths;
mod quiz;
mod routes;
mod search;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::CacheClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::quiz::questions::PlaceholderQuestionSource;
use crate::routes::build_router;
use crate::search::client::SearchClient;
use crate::search::remote::ContentSearchClient;
use crate::state::AppState;

/// Default tracing directive scoped to this crate. Tracing targets use the
/// crate name with underscores, not the hyphenated package name.
fn default_log_filter(level: &str) -> String {
    format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), level)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(&config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portal API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis cache (connection is established lazily on first use)
    let cache = CacheClient::new(&config.redis_url)?;
    info!("Cache client initialized");

    // Initialize search index client
    let search = SearchClient::new(&config.search_url)?;
    info!("Search client initialized");

    // Initialize outbound transcript retriever client
    let content_search = ContentSearchClient::new(
        &config.content_search_url,
        config.content_search_api_key.clone(),
    )?;
    info!("Content search client initialized");

    // Question source seam (PlaceholderQuestionSource until a real authoring
    // backend is wired in)
    let questions = Arc::new(PlaceholderQuestionSource);

    // Build app state
    let state = AppState {
        db,
        cache,
        search,
        content_search,
        questions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_uses_underscored_crate_name() {
        // The directive must match what tracing emits as the target, or the
        // fallback filter silences every log line.
        assert_eq!(default_log_filter("info"), "portal_api=info");
    }
}
