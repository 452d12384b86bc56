use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VideoRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub transcript: Option<String>,
    /// Duration in minutes. Drives duration-bounded path selection.
    pub duration: f64,
    pub category: String,
    pub difficulty_level: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: i64,
    pub name: String,
}

/// Document shape pushed into the `videos` search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDocument {
    pub title: String,
    pub description: String,
    pub url: String,
    pub duration: f64,
    pub category: String,
    pub difficulty_level: String,
    pub tags: Vec<String>,
    pub skills: Vec<String>,
    pub transcript: Option<String>,
}
