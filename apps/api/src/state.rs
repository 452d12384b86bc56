use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::CacheClient;
use crate::quiz::questions::QuestionSource;
use crate::search::client::SearchClient;
use crate::search::remote::ContentSearchClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every client is constructed once at bootstrap and dependency-injected here;
/// nothing holds process-global connection state.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: CacheClient,
    pub search: SearchClient,
    pub content_search: ContentSearchClient,
    /// Pluggable question authoring source. Default: PlaceholderQuestionSource.
    pub questions: Arc<dyn QuestionSource>,
}
