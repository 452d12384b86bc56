//! Learning-path generation — turns requested skills and constraints into a
//! persisted, ordered path.
//!
//! Flow: resolve skills → conjunctive video query (+difficulty) →
//!       relax difficulty once if empty → duration-bounded selection →
//!       derive title/description/estimated_hours → atomic persist.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::learning_path::{LearningPathDetail, LearningPathRow};
use crate::models::user::UserRow;
use crate::models::video::{SkillRow, VideoRow};
use crate::paths::selection::{
    dedupe_skills, estimated_hours, fit_within_cap, path_description, path_title,
};

pub const MIN_DURATION_HOURS: f64 = 1.0;
pub const MAX_DURATION_HOURS: f64 = 100.0;
pub const DEFAULT_PATH_DIFFICULTY: &str = "beginner";

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePathRequest {
    pub user_id: i64,
    /// Skill names, resolved case-sensitively. Every name must exist;
    /// duplicates are collapsed before resolution.
    pub skills: Vec<String>,
    pub difficulty_level: Option<String>,
    /// Optional duration cap in hours, bounded [1, 100].
    pub max_duration_hours: Option<f64>,
}

/// Generates and persists a learning path. Either the full path (row plus
/// video and skill associations) commits, or nothing does.
pub async fn generate_learning_path(
    pool: &PgPool,
    request: GeneratePathRequest,
) -> Result<LearningPathDetail, AppError> {
    if request.skills.is_empty() {
        return Err(AppError::Validation(
            "skills must be a non-empty list".to_string(),
        ));
    }
    if let Some(cap) = request.max_duration_hours {
        if !(MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&cap) {
            return Err(AppError::Validation(format!(
                "max_duration_hours must be between {MIN_DURATION_HOURS} and {MAX_DURATION_HOURS}"
            )));
        }
    }

    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(request.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.user_id)))?;

    // Repeated skill names collapse to one occurrence: the conjunctive query
    // counts DISTINCT skills, and learning_path_skills has a composite PK.
    let skill_names = dedupe_skills(&request.skills);

    info!(
        "Generating learning path for user {} with skills {:?}",
        user.id, skill_names
    );

    // Every requested skill must resolve; one miss fails the whole request
    // so no partial path is generated for a subset of valid skills.
    let mut skills = Vec::with_capacity(skill_names.len());
    for name in &skill_names {
        let skill = sqlx::query_as::<_, SkillRow>("SELECT id, name FROM skills WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Skill '{name}' not found")))?;
        skills.push(skill);
    }

    let difficulty = request
        .difficulty_level
        .clone()
        .or_else(|| user.skill_level.clone())
        .unwrap_or_else(|| DEFAULT_PATH_DIFFICULTY.to_string());

    // Conjunctive match with the difficulty filter, then one relaxation
    // without it. An empty result after both still produces a path.
    let mut videos = videos_matching_all_skills(pool, &skill_names, Some(&difficulty)).await?;
    if videos.is_empty() {
        warn!(
            "No videos for skills {:?} at difficulty {}, relaxing difficulty filter",
            skill_names, difficulty
        );
        videos = videos_matching_all_skills(pool, &skill_names, None).await?;
    }

    let cap_minutes = request.max_duration_hours.map(|h| h * 60.0);
    let selection = fit_within_cap(videos, cap_minutes);
    let hours = estimated_hours(&selection, request.max_duration_hours);

    let title = path_title(&skill_names);
    let description = path_description(
        &user.username,
        &skill_names,
        Some(&difficulty),
        selection.videos.len(),
    );

    // Single atomic unit: path row plus both association sets, or nothing.
    let mut tx = pool.begin().await?;

    let path = sqlx::query_as::<_, LearningPathRow>(
        r#"
        INSERT INTO learning_paths (user_id, title, description, difficulty_level, estimated_hours)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&title)
    .bind(&description)
    .bind(&difficulty)
    .bind(hours)
    .fetch_one(&mut *tx)
    .await?;

    for (position, video) in selection.videos.iter().enumerate() {
        sqlx::query(
            "INSERT INTO learning_path_videos (learning_path_id, video_id, position) VALUES ($1, $2, $3)",
        )
        .bind(path.id)
        .bind(video.id)
        .bind(position as i32)
        .execute(&mut *tx)
        .await?;
    }

    for skill in &skills {
        sqlx::query(
            "INSERT INTO learning_path_skills (learning_path_id, skill_id) VALUES ($1, $2)",
        )
        .bind(path.id)
        .bind(skill.id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Generated learning path {} with {} videos for user {}",
        path.id,
        selection.videos.len(),
        user.id
    );

    Ok(LearningPathDetail {
        path,
        videos: selection.videos,
        skills,
    })
}

/// Videos tagged with *every* skill in the set (conjunctive match), with an
/// optional difficulty filter.
async fn videos_matching_all_skills(
    pool: &PgPool,
    skill_names: &[String],
    difficulty: Option<&str>,
) -> Result<Vec<VideoRow>, sqlx::Error> {
    match difficulty {
        Some(level) => {
            sqlx::query_as::<_, VideoRow>(
                r#"
                SELECT v.* FROM videos v
                JOIN video_skills vs ON vs.video_id = v.id
                JOIN skills s ON s.id = vs.skill_id
                WHERE s.name = ANY($1) AND v.difficulty_level = $2
                GROUP BY v.id
                HAVING COUNT(DISTINCT s.id) = $3
                ORDER BY v.id
                "#,
            )
            .bind(skill_names)
            .bind(level)
            .bind(skill_names.len() as i64)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, VideoRow>(
                r#"
                SELECT v.* FROM videos v
                JOIN video_skills vs ON vs.video_id = v.id
                JOIN skills s ON s.id = vs.skill_id
                WHERE s.name = ANY($1)
                GROUP BY v.id
                HAVING COUNT(DISTINCT s.id) = $2
                ORDER BY v.id
                "#,
            )
            .bind(skill_names)
            .bind(skill_names.len() as i64)
            .fetch_all(pool)
            .await
        }
    }
}

/// Loads a path row with its ordered video set and skill set.
pub async fn load_path_detail(
    pool: &PgPool,
    path_id: i64,
) -> Result<Option<LearningPathDetail>, sqlx::Error> {
    let Some(path) =
        sqlx::query_as::<_, LearningPathRow>("SELECT * FROM learning_paths WHERE id = $1")
            .bind(path_id)
            .fetch_optional(pool)
            .await?
    else {
        return Ok(None);
    };

    let videos = sqlx::query_as::<_, VideoRow>(
        r#"
        SELECT v.* FROM videos v
        JOIN learning_path_videos lpv ON lpv.video_id = v.id
        WHERE lpv.learning_path_id = $1
        ORDER BY lpv.position
        "#,
    )
    .bind(path_id)
    .fetch_all(pool)
    .await?;

    let skills = sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT s.id, s.name FROM skills s
        JOIN learning_path_skills lps ON lps.skill_id = s.id
        WHERE lps.learning_path_id = $1
        ORDER BY s.name
        "#,
    )
    .bind(path_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(LearningPathDetail {
        path,
        videos,
        skills,
    }))
}
