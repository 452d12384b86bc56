//! Outbound transcript retriever — searches inside video content (transcript
//! segments) via an external retrieval API.
//!
//! The call is hard time-bounded; a slow or failing retriever surfaces as an
//! Upstream error rather than hanging the request.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::errors::AppError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub result_type: String,
    pub similarity: f64,
    pub text: String,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub speaker: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSearchResponse {
    pub results: Vec<ContentSearchResult>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    results: Vec<serde_json::Value>,
}

#[derive(Clone)]
pub struct ContentSearchClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ContentSearchClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Queries the retriever. Malformed result items are skipped rather than
    /// failing the whole response.
    pub async fn search_content(&self, query: &str) -> Result<ContentSearchResponse, AppError> {
        let url = format!("{}/retriever/query", self.base_url);

        let mut request = self.http.post(&url).json(&json!({ "query": query }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Content search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Content search API returned {status}: {body}"
            )));
        }

        let raw: RawResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Content search response malformed: {e}")))?;

        let mut results = Vec::with_capacity(raw.results.len());
        for item in raw.results {
            match serde_json::from_value::<ContentSearchResult>(item) {
                Ok(r) => results.push(r),
                Err(e) => warn!("Skipping malformed content search result: {e}"),
            }
        }

        info!("Content search returned {} usable results", results.len());
        Ok(ContentSearchResponse { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_parses_with_optional_fields_absent() {
        let value = json!({
            "id": "seg-1",
            "type": "transcript",
            "similarity": 0.91,
            "text": "ownership and borrowing"
        });
        let result: ContentSearchResult = serde_json::from_value(value).unwrap();
        assert!(result.start_time.is_none());
        assert!(result.speaker.is_none());
        assert_eq!(result.result_type, "transcript");
    }

    #[test]
    fn test_result_rejects_missing_required_fields() {
        let value = json!({ "id": "seg-1", "type": "transcript" });
        assert!(serde_json::from_value::<ContentSearchResult>(value).is_err());
    }
}
