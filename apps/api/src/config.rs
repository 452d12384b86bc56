use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    /// Base URL of the Elasticsearch-compatible search cluster.
    pub search_url: String,
    /// Base URL of the external transcript retriever service.
    pub content_search_url: String,
    /// Optional bearer token for the transcript retriever.
    pub content_search_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            search_url: require_env("SEARCH_URL")?,
            content_search_url: std::env::var("CONTENT_SEARCH_API_URL")
                .unwrap_or_else(|_| "http://localhost:9100".to_string()),
            content_search_api_key: std::env::var("CONTENT_SEARCH_API_KEY").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
