use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Self-reported skill tier, used as the difficulty fallback when a
    /// learning-path request carries no explicit difficulty.
    pub skill_level: Option<String>,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}
