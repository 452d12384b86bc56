//! Axum route handlers for the Learning Path API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::cache::{self, TTL_PATH};
use crate::errors::AppError;
use crate::models::learning_path::{LearningPathDetail, LearningPathRow};
use crate::models::user::UserRow;
use crate::paths::generator::{generate_learning_path, load_path_detail, GeneratePathRequest};
use crate::state::AppState;

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct ActingUser {
    pub user_id: i64,
}

/// POST /api/v1/learning-paths/generate
///
/// Full generation pipeline: skill resolution → conjunctive video match →
/// relaxation → bounded selection → atomic persist.
pub async fn handle_generate_path(
    State(state): State<AppState>,
    Json(request): Json<GeneratePathRequest>,
) -> Result<Json<LearningPathDetail>, AppError> {
    let detail = generate_learning_path(&state.db, request).await?;
    Ok(Json(detail))
}

/// GET /api/v1/learning-paths/:id
///
/// Cache-aside read of the full path detail.
pub async fn handle_get_path(
    State(state): State<AppState>,
    Path(path_id): Path<i64>,
) -> Result<Json<LearningPathDetail>, AppError> {
    let cache_key = cache::learning_path_key(path_id);
    if let Some(cached) = state.cache.get_json::<LearningPathDetail>(&cache_key).await {
        return Ok(Json(cached));
    }

    let detail = load_path_detail(&state.db, path_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Learning path {path_id} not found")))?;

    state.cache.set_json(&cache_key, &detail, TTL_PATH).await;

    Ok(Json(detail))
}

/// GET /api/v1/learning-paths
pub async fn handle_list_paths(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<LearningPathRow>>, AppError> {
    if pagination.skip < 0 || !(1..=100).contains(&pagination.limit) {
        return Err(AppError::Validation(
            "skip must be >= 0 and limit between 1 and 100".to_string(),
        ));
    }

    let paths = sqlx::query_as::<_, LearningPathRow>(
        "SELECT * FROM learning_paths ORDER BY id OFFSET $1 LIMIT $2",
    )
    .bind(pagination.skip)
    .bind(pagination.limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(paths))
}

/// DELETE /api/v1/learning-paths/:id?user_id=...
///
/// Only the owning user or a superuser may delete a path. The cached entry
/// is invalidated, not updated — the next read repopulates from the store.
pub async fn handle_delete_path(
    State(state): State<AppState>,
    Path(path_id): Path<i64>,
    Query(acting): Query<ActingUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let path = sqlx::query_as::<_, LearningPathRow>("SELECT * FROM learning_paths WHERE id = $1")
        .bind(path_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Learning path {path_id} not found")))?;

    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(acting.user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", acting.user_id)))?;

    if path.user_id != user.id && !user.is_superuser {
        return Err(AppError::Forbidden);
    }

    // Association rows go with the path via ON DELETE CASCADE.
    sqlx::query("DELETE FROM learning_paths WHERE id = $1")
        .bind(path_id)
        .execute(&state.db)
        .await?;

    state.cache.delete(&cache::learning_path_key(path_id)).await;

    info!("Deleted learning path {path_id} for user {}", user.id);
    Ok(Json(serde_json::json!({
        "message": "Learning path deleted successfully"
    })))
}
