use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A single question embedded in a quiz's JSONB `questions` column.
/// Not a standalone row — the question list is immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
}

/// One quiz per (video_id, difficulty_level) — enforced by a unique
/// constraint, which is what makes generation idempotent under concurrency.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizRow {
    pub id: i64,
    pub video_id: i64,
    pub title: String,
    pub description: String,
    pub difficulty_level: String,
    pub questions: Json<Vec<QuizQuestion>>,
    /// Minimum score (0–100) to pass.
    pub passing_score: i32,
    /// Time limit in minutes.
    pub time_limit: i32,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of a scored submission. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttemptRow {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub answers: Json<Vec<i32>>,
    pub score: i32,
    pub completed: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
