//! Pure selection and derivation logic for learning-path generation.
//!
//! Kept free of database access so the bounded-selection policy and the
//! derived-field rules are directly testable.

use std::collections::HashSet;

use crate::models::video::VideoRow;

/// Collapses repeated skill names, keeping first-occurrence order.
///
/// Requests may name the same skill twice; the conjunctive video match and
/// the path↔skill associations both need each skill exactly once, so the
/// duplicate must not inflate the expected distinct-match count.
pub fn dedupe_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Outcome of duration-bounded selection.
#[derive(Debug, Clone)]
pub struct BoundedSelection {
    pub videos: Vec<VideoRow>,
    /// Summed duration of the selected videos, in minutes.
    pub total_minutes: f64,
    /// Whether the cap actually removed anything.
    pub truncated: bool,
}

/// Applies an optional duration cap (minutes) to a matched video set.
///
/// Policy: sort ascending by duration, then take every video that still fits
/// under the cap. This favors video count over duration-per-video; it is not
/// a value-optimizing knapsack, and ties resolve by the ascending-duration
/// order alone.
pub fn fit_within_cap(mut videos: Vec<VideoRow>, cap_minutes: Option<f64>) -> BoundedSelection {
    let total: f64 = videos.iter().map(|v| v.duration).sum();

    let Some(cap) = cap_minutes else {
        return BoundedSelection {
            videos,
            total_minutes: total,
            truncated: false,
        };
    };

    if total <= cap {
        return BoundedSelection {
            videos,
            total_minutes: total,
            truncated: false,
        };
    }

    videos.sort_by(|a, b| {
        a.duration
            .partial_cmp(&b.duration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut selected = Vec::new();
    let mut running = 0.0;
    for video in videos {
        if running + video.duration <= cap {
            running += video.duration;
            selected.push(video);
        }
    }

    BoundedSelection {
        videos: selected,
        total_minutes: running,
        truncated: true,
    }
}

/// Derives estimated_hours: the caller-supplied cap wins when it actually
/// bounded the selection, otherwise the summed duration converted to hours.
pub fn estimated_hours(selection: &BoundedSelection, cap_hours: Option<f64>) -> f64 {
    match cap_hours {
        Some(cap) if selection.truncated => cap,
        _ => selection.total_minutes / 60.0,
    }
}

/// "Learning Path: <skill>, <skill>, ..."
pub fn path_title(skills: &[String]) -> String {
    format!("Learning Path: {}", skills.join(", "))
}

/// Generated path description, always produced — a zero-video result carries
/// "0 relevant videos" rather than failing.
pub fn path_description(
    username: &str,
    skills: &[String],
    difficulty: Option<&str>,
    video_count: usize,
) -> String {
    format!(
        "Personalized learning path for {} focusing on: {}. Difficulty level: {}. \
         Contains {} relevant videos.",
        username,
        skills.join(", "),
        difficulty.unwrap_or("any"),
        video_count
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_video(id: i64, duration: f64) -> VideoRow {
        VideoRow {
            id,
            title: format!("Video {id}"),
            description: String::new(),
            url: format!("https://videos.example/{id}"),
            transcript: None,
            duration,
            category: "programming".to_string(),
            difficulty_level: "beginner".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_duplicate_skill_names_collapse() {
        // ["rust", "rust"] must behave exactly like ["rust"]: one resolved
        // skill, one association row, and a conjunctive match count of 1.
        let skills = vec!["rust".to_string(), "rust".to_string()];
        assert_eq!(dedupe_skills(&skills), vec!["rust".to_string()]);
    }

    #[test]
    fn test_dedupe_preserves_first_occurrence_order() {
        let skills: Vec<String> = ["async", "rust", "async", "sql", "rust"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedupe_skills(&skills), vec!["async", "rust", "sql"]);
    }

    #[test]
    fn test_dedupe_is_case_sensitive() {
        // Skill names are case-sensitive unique keys; "Rust" and "rust"
        // are distinct skills and must both survive.
        let skills = vec!["Rust".to_string(), "rust".to_string()];
        assert_eq!(dedupe_skills(&skills).len(), 2);
    }

    #[test]
    fn test_no_cap_keeps_everything() {
        let videos = vec![make_video(1, 30.0), make_video(2, 45.0)];
        let selection = fit_within_cap(videos, None);
        assert_eq!(selection.videos.len(), 2);
        assert_eq!(selection.total_minutes, 75.0);
        assert!(!selection.truncated);
    }

    #[test]
    fn test_cap_above_total_keeps_everything() {
        let videos = vec![make_video(1, 30.0), make_video(2, 45.0)];
        let selection = fit_within_cap(videos, Some(120.0));
        assert_eq!(selection.videos.len(), 2);
        assert!(!selection.truncated);
    }

    #[test]
    fn test_cap_50_selects_10_and_20() {
        // Durations [10, 20, 25, 40] with cap 50: 10+20 fit, 25 would push
        // the total to 55 and 40 to 70, so neither can be added.
        let videos = vec![
            make_video(1, 10.0),
            make_video(2, 20.0),
            make_video(3, 25.0),
            make_video(4, 40.0),
        ];
        let selection = fit_within_cap(videos, Some(50.0));
        let durations: Vec<f64> = selection.videos.iter().map(|v| v.duration).collect();
        assert_eq!(durations, vec![10.0, 20.0]);
        assert_eq!(selection.total_minutes, 30.0);
        assert!(selection.truncated);
    }

    #[test]
    fn test_cap_selection_skips_then_keeps_fitting() {
        // Ascending order [5, 30, 40] with cap 50: 5 and 30 fit (35), 40
        // does not. Nothing that still fits is left behind.
        let videos = vec![make_video(1, 40.0), make_video(2, 5.0), make_video(3, 30.0)];
        let selection = fit_within_cap(videos, Some(50.0));
        let durations: Vec<f64> = selection.videos.iter().map(|v| v.duration).collect();
        assert_eq!(durations, vec![5.0, 30.0]);
    }

    #[test]
    fn test_selection_never_exceeds_cap() {
        let videos: Vec<VideoRow> = (1..=10).map(|i| make_video(i, i as f64 * 7.0)).collect();
        let cap = 60.0;
        let selection = fit_within_cap(videos, Some(cap));
        assert!(selection.total_minutes <= cap);
    }

    #[test]
    fn test_estimated_hours_cap_wins_only_when_truncated() {
        let truncated = BoundedSelection {
            videos: vec![],
            total_minutes: 30.0,
            truncated: true,
        };
        assert_eq!(estimated_hours(&truncated, Some(2.0)), 2.0);

        let untouched = BoundedSelection {
            videos: vec![],
            total_minutes: 90.0,
            truncated: false,
        };
        assert_eq!(estimated_hours(&untouched, Some(5.0)), 1.5);
        assert_eq!(estimated_hours(&untouched, None), 1.5);
    }

    #[test]
    fn test_title_joins_skills() {
        let skills = vec!["rust".to_string(), "async".to_string()];
        assert_eq!(path_title(&skills), "Learning Path: rust, async");
    }

    #[test]
    fn test_description_for_empty_result_says_zero_videos() {
        let skills = vec!["rust".to_string()];
        let description = path_description("alice", &skills, Some("beginner"), 0);
        assert!(
            description.contains("Contains 0 relevant videos"),
            "Empty result must still produce a description: {description}"
        );
        assert!(description.contains("alice"));
        assert!(description.contains("beginner"));
    }

    #[test]
    fn test_description_without_difficulty_says_any() {
        let skills = vec!["sql".to_string()];
        let description = path_description("bob", &skills, None, 3);
        assert!(description.contains("Difficulty level: any"));
    }
}
