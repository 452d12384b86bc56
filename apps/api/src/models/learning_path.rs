use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::video::{SkillRow, VideoRow};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningPathRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub difficulty_level: Option<String>,
    /// Derived from member video durations (minutes → hours), or the
    /// caller-supplied cap when the selection was truncated to fit it.
    pub estimated_hours: f64,
    pub created_at: DateTime<Utc>,
}

/// A learning path with its ordered video set and skill set resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPathDetail {
    #[serde(flatten)]
    pub path: LearningPathRow,
    pub videos: Vec<VideoRow>,
    pub skills: Vec<SkillRow>,
}
