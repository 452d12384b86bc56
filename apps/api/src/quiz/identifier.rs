//! Dual-format quiz identifier resolution.
//!
//! Clients may reference a quiz by its numeric id (preferred) or by the
//! legacy composite string `quiz_<video_id>_<difficulty>` kept for backward
//! compatibility. Any other shape is a caller error.

use crate::errors::AppError;

/// A parsed quiz reference, ready for a database lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizRef {
    /// Lookup by primary key.
    Id(i64),
    /// Legacy lookup by the (video_id, difficulty_level) uniqueness key.
    VideoDifficulty { video_id: i64, difficulty: String },
}

pub fn parse_quiz_ref(raw: &str) -> Result<QuizRef, AppError> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(QuizRef::Id(id));
    }

    let Some(rest) = raw.strip_prefix("quiz_") else {
        return Err(AppError::Validation("Invalid quiz ID format".to_string()));
    };
    // The difficulty is the third underscore-delimited segment of the full
    // identifier; any further segments are ignored.
    let mut segments = rest.split('_');
    let video_part = segments.next().unwrap_or("");
    let Some(difficulty) = segments.next() else {
        return Err(AppError::Validation("Invalid quiz ID format".to_string()));
    };
    let video_id = video_part.parse::<i64>().map_err(|_| {
        AppError::Validation("Invalid quiz ID format: video_id must be an integer".to_string())
    })?;
    if difficulty.is_empty() {
        return Err(AppError::Validation("Invalid quiz ID format".to_string()));
    }

    Ok(QuizRef::VideoDifficulty {
        video_id,
        difficulty: difficulty.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_preferred() {
        assert_eq!(parse_quiz_ref("42").unwrap(), QuizRef::Id(42));
    }

    #[test]
    fn test_legacy_format_resolves_video_and_difficulty() {
        assert_eq!(
            parse_quiz_ref("quiz_12_medium").unwrap(),
            QuizRef::VideoDifficulty {
                video_id: 12,
                difficulty: "medium".to_string()
            }
        );
    }

    #[test]
    fn test_legacy_difficulty_is_third_segment_only() {
        // "quiz_5_very_hard" splits to ["quiz", "5", "very", "hard"]; the
        // difficulty is the third segment and the tail is ignored.
        assert_eq!(
            parse_quiz_ref("quiz_5_very_hard").unwrap(),
            QuizRef::VideoDifficulty {
                video_id: 5,
                difficulty: "very".to_string()
            }
        );
    }

    #[test]
    fn test_non_integer_video_id_rejected() {
        let err = parse_quiz_ref("quiz_abc_medium").unwrap_err();
        assert!(
            matches!(err, AppError::Validation(msg) if msg.contains("video_id must be an integer"))
        );
    }

    #[test]
    fn test_unprefixed_string_rejected() {
        assert!(matches!(
            parse_quiz_ref("something_12_medium"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_segments_rejected() {
        assert!(matches!(
            parse_quiz_ref("quiz_12"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_quiz_ref("quiz_12_"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(parse_quiz_ref(""), Err(AppError::Validation(_))));
    }
}
