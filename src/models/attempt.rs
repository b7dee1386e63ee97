// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::answer::AnswerSubmission;

/// Represents the 'quiz_students' table.
/// Identity of an anonymous taker within one quiz, keyed by the
/// (quiz_id, enrollment_number) natural key. The id is stable for the
/// life of the quiz; only name/email are refreshed on later submissions.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizStudent {
    pub id: i64,
    pub quiz_id: i64,
    pub name: String,
    pub enrollment_number: String,
    pub email: Option<String>,
}

/// Represents the 'quiz_attempts' table.
/// One row per submission event; a student may accumulate many.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    /// Integer percentage, 0..=100, computed at submission time.
    pub score: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'attempt_answers' table.
/// Correctness is computed and stored at submission time for this flow.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub option_id: Option<i64>,
    pub text_answer: Option<String>,
    pub is_correct: bool,
}

/// DTO for the anonymous online-attempt submission endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct OnlineSubmissionRequest {
    #[validate(length(min = 1, max = 200, message = "Student name must not be empty."))]
    pub student_name: String,
    #[validate(length(min = 1, max = 100, message = "Enrollment number must not be empty."))]
    pub enrollment_number: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "At least one answer is required."))]
    pub answers: Vec<AnswerSubmission>,
}

/// Result summary returned to the anonymous taker after submission.
#[derive(Debug, Serialize)]
pub struct AttemptReceipt {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub enrollment_number: String,
    pub score: i32,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// One attempt joined with its student identity, for the creator view.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptSummary {
    pub attempt_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub enrollment_number: String,
    pub email: Option<String>,
    pub score: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub answer_count: i64,
}

/// Creator-only results payload: every attempt, newest first.
#[derive(Debug, Serialize)]
pub struct CreatorResultsResponse {
    pub quiz_id: i64,
    pub quiz_title: String,
    pub is_online_attempt: bool,
    pub attempts: Vec<AttemptSummary>,
}
