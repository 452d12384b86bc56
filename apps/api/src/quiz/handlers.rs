//! Axum route handlers for the Quiz API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;

use crate::cache::{self, TTL_ENTITY, TTL_LIST};
use crate::errors::AppError;
use crate::models::quiz::QuizRow;
use crate::quiz::engine::{generate_quiz, submit_quiz, GenerateQuizParams, QuizResult, QuizSubmission};
use crate::quiz::questions::{DEFAULT_NUM_QUESTIONS, DEFAULT_QUIZ_DIFFICULTY};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QuizGenerateRequest {
    pub video_id: i64,
    pub difficulty_level: Option<String>,
    pub num_questions: Option<usize>,
}

/// Listing entry — deliberately excludes the question list (and with it the
/// correct answers) from the browse surface.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub video_id: i64,
    pub difficulty_level: String,
    pub passing_score: i32,
    pub time_limit: i32,
}

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

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/quizzes/generate
///
/// Idempotent: a repeat request for the same (video, difficulty) returns the
/// existing quiz instead of creating a duplicate.
pub async fn handle_generate_quiz(
    State(state): State<AppState>,
    Json(request): Json<QuizGenerateRequest>,
) -> Result<Json<QuizRow>, AppError> {
    let params = GenerateQuizParams {
        video_id: request.video_id,
        difficulty_level: request
            .difficulty_level
            .unwrap_or_else(|| DEFAULT_QUIZ_DIFFICULTY.to_string()),
        num_questions: request.num_questions.unwrap_or(DEFAULT_NUM_QUESTIONS),
    };

    info!(
        "Generating quiz for video {} at difficulty {}",
        params.video_id, params.difficulty_level
    );

    let quiz = generate_quiz(&state.db, &state.cache, state.questions.as_ref(), params).await?;
    Ok(Json(quiz))
}

/// POST /api/v1/quizzes/submit
pub async fn handle_submit_quiz(
    State(state): State<AppState>,
    Json(submission): Json<QuizSubmission>,
) -> Result<Json<QuizResult>, AppError> {
    info!("Processing quiz submission for quiz_id {}", submission.quiz_id);
    let result = submit_quiz(&state.db, &state.cache, submission).await?;
    Ok(Json(result))
}

/// GET /api/v1/quizzes/:id
///
/// Cache-aside read. Quizzes are immutable once generated, so the cached
/// entry gets the long TTL.
pub async fn handle_get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizRow>, AppError> {
    let cache_key = cache::quiz_key(quiz_id);
    if let Some(cached) = state.cache.get_json::<QuizRow>(&cache_key).await {
        return Ok(Json(cached));
    }

    let quiz = sqlx::query_as::<_, QuizRow>("SELECT * FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {quiz_id} not found")))?;

    state.cache.set_json(&cache_key, &quiz, TTL_ENTITY).await;

    Ok(Json(quiz))
}

/// GET /api/v1/quizzes
///
/// Paginated listing with a short-TTL cache entry per page; quiz creation
/// invalidates the whole listing prefix.
pub async fn handle_list_quizzes(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<QuizSummary>>, AppError> {
    if pagination.skip < 0 || !(1..=100).contains(&pagination.limit) {
        return Err(AppError::Validation(
            "skip must be >= 0 and limit between 1 and 100".to_string(),
        ));
    }

    let cache_key = cache::quiz_list_key(pagination.skip, pagination.limit);
    if let Some(cached) = state.cache.get_json::<Vec<QuizSummary>>(&cache_key).await {
        return Ok(Json(cached));
    }

    let quizzes = sqlx::query_as::<_, QuizSummary>(
        r#"
        SELECT id, title, description, video_id, difficulty_level, passing_score, time_limit
        FROM quizzes
        ORDER BY id
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(pagination.skip)
    .bind(pagination.limit)
    .fetch_all(&state.db)
    .await?;

    state.cache.set_json(&cache_key, &quizzes, TTL_LIST).await;

    Ok(Json(quizzes))
}
