//! Quiz engine — idempotent generation and submission scoring.
//!
//! State machine per (video, difficulty) pair: Absent → Generated → read-many.
//! Generation is idempotent: the `quizzes` table carries a unique constraint
//! on (video_id, difficulty_level), and an insert that loses a concurrent
//! race falls back to fetching the winner's row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use crate::cache::{self, CacheClient, QUIZ_LIST_PREFIX, TTL_ENTITY};
use crate::errors::AppError;
use crate::models::quiz::{QuizAttemptRow, QuizQuestion, QuizRow};
use crate::models::video::VideoRow;
use crate::quiz::identifier::{parse_quiz_ref, QuizRef};
use crate::quiz::questions::{
    QuestionSource, DEFAULT_PASSING_SCORE, DEFAULT_TIME_LIMIT_MINUTES, MAX_NUM_QUESTIONS,
    MIN_NUM_QUESTIONS,
};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GenerateQuizParams {
    pub video_id: i64,
    pub difficulty_level: String,
    pub num_questions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSubmission {
    pub quiz_id: String,
    /// Zero-based option indices, positionally aligned to the question order.
    pub answers: Vec<i32>,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: String,
    pub user_id: String,
    pub attempt_id: i64,
    pub score: i32,
    pub passed: bool,
    pub correct_answers: Vec<bool>,
    pub explanations: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Outcome of positional scoring, before pass/fail is decided.
#[derive(Debug, Clone)]
pub struct ScoredAnswers {
    pub score: i32,
    pub correct_answers: Vec<bool>,
    pub explanations: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores a submission positionally: each correct answer is worth
/// `100 / question_count` points, accumulated as a float and truncated to an
/// integer at the end. Counts that do not divide 100 therefore truncate down
/// (2 of 3 correct is 66, not 67).
pub fn score_answers(
    questions: &[QuizQuestion],
    answers: &[i32],
) -> Result<ScoredAnswers, AppError> {
    if answers.len() != questions.len() {
        return Err(AppError::Validation(format!(
            "Invalid number of answers. Expected {}, got {}",
            questions.len(),
            answers.len()
        )));
    }

    let points_per_question = 100.0 / questions.len() as f64;
    let mut score = 0.0_f64;
    let mut correct_answers = Vec::with_capacity(questions.len());
    let mut explanations = Vec::with_capacity(questions.len());

    for (answer, question) in answers.iter().zip(questions) {
        let is_correct = *answer == question.correct_answer as i32;
        if is_correct {
            score += points_per_question;
        }
        correct_answers.push(is_correct);
        explanations.push(question.explanation.clone());
    }

    Ok(ScoredAnswers {
        score: score as i32,
        correct_answers,
        explanations,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Generates (or returns the existing) quiz for a (video, difficulty) pair.
///
/// Steps:
/// 1. Validate the requested question count
/// 2. Verify the video exists
/// 3. Lookup by (video_id, difficulty_level) — hit means idempotent return
/// 4. Synthesize questions through the QuestionSource seam
/// 5. INSERT .. ON CONFLICT DO NOTHING; a lost race re-fetches the winner
/// 6. Cache the quiz, invalidate the listing pages
pub async fn generate_quiz(
    pool: &PgPool,
    cache: &CacheClient,
    source: &dyn QuestionSource,
    params: GenerateQuizParams,
) -> Result<QuizRow, AppError> {
    if !(MIN_NUM_QUESTIONS..=MAX_NUM_QUESTIONS).contains(&params.num_questions) {
        return Err(AppError::Validation(format!(
            "num_questions must be between {MIN_NUM_QUESTIONS} and {MAX_NUM_QUESTIONS}"
        )));
    }

    let video = sqlx::query_as::<_, VideoRow>("SELECT * FROM videos WHERE id = $1")
        .bind(params.video_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video with ID {} not found", params.video_id)))?;

    // Uniqueness checks always hit the database, never the cache.
    let existing = fetch_by_video_and_difficulty(pool, params.video_id, &params.difficulty_level)
        .await?;
    if let Some(quiz) = existing {
        info!(
            "Quiz already exists for video {} at difficulty {}, returning id {}",
            params.video_id, params.difficulty_level, quiz.id
        );
        return Ok(quiz);
    }

    let questions = source
        .generate(&video, &params.difficulty_level, params.num_questions)
        .await?;
    info!(
        "Generated {} questions for video {} at difficulty {}",
        questions.len(),
        params.video_id,
        params.difficulty_level
    );

    let inserted = sqlx::query_as::<_, QuizRow>(
        r#"
        INSERT INTO quizzes
            (video_id, title, description, difficulty_level, questions, passing_score, time_limit)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (video_id, difficulty_level) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(params.video_id)
    .bind(format!("Quiz for Video {}", params.video_id))
    .bind(format!("Test your knowledge of Video {}", params.video_id))
    .bind(&params.difficulty_level)
    .bind(Json(&questions))
    .bind(DEFAULT_PASSING_SCORE)
    .bind(DEFAULT_TIME_LIMIT_MINUTES)
    .fetch_optional(pool)
    .await?;

    let quiz = match inserted {
        Some(quiz) => quiz,
        // Lost a concurrent generation race — the conflict is the idempotency
        // signal, so return the row that won.
        None => {
            info!(
                "Concurrent generation for video {} at difficulty {}, fetching existing quiz",
                params.video_id, params.difficulty_level
            );
            fetch_by_video_and_difficulty(pool, params.video_id, &params.difficulty_level)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(
                        "Quiz generation conflicted but no existing quiz was found".to_string(),
                    )
                })?
        }
    };

    cache
        .set_json(&cache::quiz_key(quiz.id), &quiz, TTL_ENTITY)
        .await;
    cache.invalidate_prefix(QUIZ_LIST_PREFIX).await;

    Ok(quiz)
}

// ────────────────────────────────────────────────────────────────────────────
// Submission
// ────────────────────────────────────────────────────────────────────────────

/// Scores a submission and persists an append-only attempt record.
/// Validation failures reject before any row is written.
pub async fn submit_quiz(
    pool: &PgPool,
    cache: &CacheClient,
    submission: QuizSubmission,
) -> Result<QuizResult, AppError> {
    let quiz_ref = parse_quiz_ref(&submission.quiz_id)?;
    let quiz = resolve_quiz(pool, &quiz_ref).await?;

    let user_id = submission.user_id.parse::<i64>().map_err(|_| {
        AppError::Validation("Invalid user ID format. Expected an integer.".to_string())
    })?;

    let scored = score_answers(&quiz.questions.0, &submission.answers)?;
    let passed = scored.score >= quiz.passing_score;
    let submitted_at = Utc::now();

    let attempt = sqlx::query_as::<_, QuizAttemptRow>(
        r#"
        INSERT INTO quiz_attempts
            (quiz_id, user_id, answers, score, completed, started_at, completed_at)
        VALUES ($1, $2, $3, $4, TRUE, $5, $5)
        RETURNING *
        "#,
    )
    .bind(quiz.id)
    .bind(user_id)
    .bind(Json(&submission.answers))
    .bind(scored.score)
    .bind(submitted_at)
    .fetch_one(pool)
    .await?;

    info!(
        "Saved quiz attempt {} for quiz {}, user {}, score {}",
        attempt.id, quiz.id, user_id, scored.score
    );

    let result = QuizResult {
        quiz_id: quiz.id.to_string(),
        user_id: user_id.to_string(),
        attempt_id: attempt.id,
        score: scored.score,
        passed,
        correct_answers: scored.correct_answers,
        explanations: scored.explanations,
        submitted_at,
    };

    cache
        .set_json(
            &cache::quiz_result_key(quiz.id, user_id, attempt.id),
            &result,
            TTL_ENTITY,
        )
        .await;

    Ok(result)
}

/// Resolves a parsed quiz reference to its row.
pub async fn resolve_quiz(pool: &PgPool, quiz_ref: &QuizRef) -> Result<QuizRow, AppError> {
    let quiz = match quiz_ref {
        QuizRef::Id(id) => {
            sqlx::query_as::<_, QuizRow>("SELECT * FROM quizzes WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        QuizRef::VideoDifficulty {
            video_id,
            difficulty,
        } => fetch_by_video_and_difficulty(pool, *video_id, difficulty).await?,
    };
    quiz.ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
}

async fn fetch_by_video_and_difficulty(
    pool: &PgPool,
    video_id: i64,
    difficulty: &str,
) -> Result<Option<QuizRow>, sqlx::Error> {
    sqlx::query_as::<_, QuizRow>(
        "SELECT * FROM quizzes WHERE video_id = $1 AND difficulty_level = $2",
    )
    .bind(video_id)
    .bind(difficulty)
    .fetch_optional(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_questions(n: usize) -> Vec<QuizQuestion> {
        (1..=n)
            .map(|i| QuizQuestion {
                id: format!("question_{i}"),
                question: format!("Question {i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: 0,
                explanation: format!("Explanation for question {i}"),
            })
            .collect()
    }

    #[test]
    fn test_three_of_four_correct_is_75() {
        let questions = make_questions(4);
        let scored = score_answers(&questions, &[0, 0, 0, 1]).unwrap();
        assert_eq!(scored.score, 75);
        assert_eq!(scored.correct_answers, vec![true, true, true, false]);
        assert!(scored.score >= 70, "75 passes a passing_score of 70");
    }

    #[test]
    fn test_uneven_division_truncates() {
        // 2 of 3 correct: 66.66.. truncates to 66, not rounds to 67.
        let questions = make_questions(3);
        let scored = score_answers(&questions, &[0, 0, 2]).unwrap();
        assert_eq!(scored.score, 66);
    }

    #[test]
    fn test_all_correct_is_100() {
        let questions = make_questions(7);
        let answers = vec![0; 7];
        let scored = score_answers(&questions, &answers).unwrap();
        assert_eq!(scored.score, 100);
        assert!(scored.correct_answers.iter().all(|c| *c));
    }

    #[test]
    fn test_answer_count_mismatch_rejected() {
        let questions = make_questions(4);
        let err = score_answers(&questions, &[0, 0]).unwrap_err();
        assert!(
            matches!(err, AppError::Validation(msg) if msg.contains("Expected 4, got 2")),
            "Mismatch must be a validation error naming both counts"
        );
    }

    #[test]
    fn test_explanations_returned_for_every_question() {
        let questions = make_questions(3);
        let scored = score_answers(&questions, &[1, 1, 1]).unwrap();
        assert_eq!(scored.explanations.len(), 3);
        assert_eq!(scored.score, 0);
    }
}
