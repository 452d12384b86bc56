//! Axum route handlers for the Video Search API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{self, TTL_SEARCH};
use crate::errors::AppError;
use crate::models::video::{VideoDocument, VideoRow};
use crate::search::query::{video_index_mapping, video_search_query, VIDEO_INDEX};
use crate::search::remote::ContentSearchResponse;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct VideoSearchRequest {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

/// One search hit, flattened from the index document. The index id is the
/// video's database id rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSearchHit {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub duration: f64,
    pub category: String,
    pub difficulty_level: String,
    pub tags: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentSearchRequest {
    pub query: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/videos/search
///
/// Free-text search over the video index, cache-aside keyed by (query, page).
/// A missing index is zero results, never an error.
pub async fn handle_search_videos(
    State(state): State<AppState>,
    Json(request): Json<VideoSearchRequest>,
) -> Result<Json<Vec<VideoSearchHit>>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }
    if request.page < 1 {
        return Err(AppError::Validation("page must be >= 1".to_string()));
    }
    if !(1..=100).contains(&request.per_page) {
        return Err(AppError::Validation(
            "per_page must be between 1 and 100".to_string(),
        ));
    }

    let cache_key = cache::video_search_key(&request.query, request.page);
    if let Some(cached) = state.cache.get_json::<Vec<VideoSearchHit>>(&cache_key).await {
        return Ok(Json(cached));
    }

    let query = video_search_query(&request.query, request.page, request.per_page);
    let response = state
        .search
        .search(VIDEO_INDEX, &query)
        .await
        .map_err(|e| AppError::Upstream(format!("Video search failed: {e}")))?;

    let mut hits = Vec::with_capacity(response.hits.hits.len());
    for hit in response.hits.hits {
        let doc: VideoDocument = match serde_json::from_value(hit.source) {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping malformed index document {}: {e}", hit.id);
                continue;
            }
        };
        hits.push(VideoSearchHit {
            id: hit.id,
            title: doc.title,
            description: doc.description,
            url: doc.url,
            duration: doc.duration,
            category: doc.category,
            difficulty_level: doc.difficulty_level,
            tags: doc.tags,
            skills: doc.skills,
        });
    }

    state.cache.set_json(&cache_key, &hits, TTL_SEARCH).await;

    Ok(Json(hits))
}

/// POST /api/v1/videos/setup-index
///
/// Creates the `videos` index with its field mapping if absent.
pub async fn handle_setup_index(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .search
        .ensure_index(VIDEO_INDEX, &video_index_mapping())
        .await
        .map_err(|e| AppError::Upstream(format!("Index setup failed: {e}")))?;

    Ok(Json(serde_json::json!({
        "message": "Video index created successfully"
    })))
}

/// POST /api/v1/videos/:id/index
///
/// (Re)indexes one video from the database into the search index.
pub async fn handle_index_video(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let video = sqlx::query_as::<_, VideoRow>("SELECT * FROM videos WHERE id = $1")
        .bind(video_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video with ID {video_id} not found")))?;

    let skills: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT s.name FROM skills s
        JOIN video_skills vs ON vs.skill_id = s.id
        WHERE vs.video_id = $1
        ORDER BY s.name
        "#,
    )
    .bind(video_id)
    .fetch_all(&state.db)
    .await?;

    let tags: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT t.name FROM tags t
        JOIN video_tags vt ON vt.tag_id = t.id
        WHERE vt.video_id = $1
        ORDER BY t.name
        "#,
    )
    .bind(video_id)
    .fetch_all(&state.db)
    .await?;

    let doc = VideoDocument {
        title: video.title,
        description: video.description,
        url: video.url,
        duration: video.duration,
        category: video.category,
        difficulty_level: video.difficulty_level,
        tags,
        skills,
        transcript: video.transcript,
    };
    let doc_value = serde_json::to_value(&doc)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize document: {e}")))?;

    state
        .search
        .index_document(VIDEO_INDEX, &doc_value, &video_id.to_string())
        .await
        .map_err(|e| AppError::Upstream(format!("Indexing failed: {e}")))?;

    info!("Indexed video {video_id}");
    Ok(Json(serde_json::json!({ "indexed": video_id })))
}

/// DELETE /api/v1/videos/:id/index
///
/// Removes a video's document from the search index. Absent documents are a
/// no-op so removal is idempotent.
pub async fn handle_remove_video_from_index(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .search
        .delete_document(VIDEO_INDEX, &video_id.to_string())
        .await
        .map_err(|e| AppError::Upstream(format!("Index removal failed: {e}")))?;

    Ok(Json(serde_json::json!({ "removed": video_id })))
}

/// POST /api/v1/videos/content/search
///
/// Searches inside video content via the external transcript retriever.
pub async fn handle_search_content(
    State(state): State<AppState>,
    Json(request): Json<ContentSearchRequest>,
) -> Result<Json<ContentSearchResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let response = state.content_search.search_content(&request.query).await?;
    Ok(Json(response))
}
