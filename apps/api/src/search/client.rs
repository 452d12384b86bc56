//! Search index client — the single point of entry for all search-cluster
//! calls. Speaks the Elasticsearch-compatible REST API over HTTP.
//!
//! The index is an accelerator, never a source of truth: a missing index is
//! reported as zero hits so the read path survives index-provisioning races.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Transport-level timeout for every search-cluster call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search cluster returned status {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: SearchHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHits {
    pub total: SearchTotal,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTotal {
    pub value: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: Value,
}

impl SearchResponse {
    fn empty() -> Self {
        SearchResponse {
            hits: SearchHits {
                total: SearchTotal { value: 0 },
                hits: Vec::new(),
            },
        }
    }
}

/// Dependency-injected search handle, constructed at bootstrap and passed
/// through AppState rather than held as a process global.
#[derive(Clone)]
pub struct SearchClient {
    http: Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates the index with the given mapping if it does not already exist.
    pub async fn ensure_index(&self, index: &str, mapping: &Value) -> Result<(), SearchError> {
        let url = format!("{}/{}", self.base_url, index);

        let head = self.http.head(&url).send().await?;
        if head.status().is_success() {
            debug!("Index {index} already exists");
            return Ok(());
        }
        if head.status() != StatusCode::NOT_FOUND {
            return Err(api_error(head).await);
        }

        let body = serde_json::json!({
            "mappings": mapping,
            "settings": {
                "number_of_shards": 1,
                "number_of_replicas": 0
            }
        });
        let response = self.http.put(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        debug!("Created index {index}");
        Ok(())
    }

    /// Indexes (or replaces) a document, making it immediately searchable.
    pub async fn index_document(
        &self,
        index: &str,
        doc: &Value,
        doc_id: &str,
    ) -> Result<(), SearchError> {
        let url = format!("{}/{}/_doc/{}?refresh=true", self.base_url, index, doc_id);
        let response = self.http.put(&url).json(doc).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        debug!("Indexed document {doc_id} in {index}");
        Ok(())
    }

    /// Runs a query against an index. A missing index yields zero hits,
    /// not an error.
    pub async fn search(&self, index: &str, query: &Value) -> Result<SearchResponse, SearchError> {
        let url = format!("{}/{}/_search", self.base_url, index);
        let response = self.http.post(&url).json(query).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("Index {index} not found, returning empty results");
            return Ok(SearchResponse::empty());
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: SearchResponse = response.json().await?;
        debug!(
            "Search in {index} returned {} hits",
            parsed.hits.hits.len()
        );
        Ok(parsed)
    }

    /// Removes a document from the index. Deleting an absent document is a no-op.
    pub async fn delete_document(&self, index: &str, doc_id: &str) -> Result<(), SearchError> {
        let url = format!("{}/{}/_doc/{}?refresh=true", self.base_url, index, doc_id);
        let response = self.http.delete(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("Document {doc_id} not found in {index}, nothing to delete");
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        debug!("Deleted document {doc_id} from {index}");
        Ok(())
    }
}

async fn api_error(response: reqwest::Response) -> SearchError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    SearchError::Api { status, message }
}
