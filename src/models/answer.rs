// src/models/answer.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::quiz::QuestionKind;

/// Represents the 'answers' table (authenticated flow).
/// quiz_id is denormalized for efficient per-user result lookup.
/// Correctness is not stored; it is computed when results are read.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub quiz_id: i64,
    pub question_id: i64,
    pub user_id: i64,
    pub option_id: Option<i64>,
    pub text_answer: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One submitted answer tuple, shared by both submission flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: i64,
    #[serde(default)]
    pub option_id: Option<i64>,
    #[serde(default)]
    pub text_answer: Option<String>,
}

/// DTO for the authenticated submission endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(length(min = 1, message = "At least one answer is required."))]
    pub answers: Vec<AnswerSubmission>,
}

/// Per-question line of the authenticated results breakdown.
#[derive(Debug, Serialize)]
pub struct AnswerBreakdown {
    pub question_id: i64,
    pub question_text: String,
    pub question_kind: QuestionKind,
    /// The taker's chosen option text, or their free-text answer.
    pub user_answer: Option<String>,
    /// The correct option text, or a fixed marker for descriptive questions.
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Full results payload for the authenticated flow.
#[derive(Debug, Serialize)]
pub struct OwnResultsResponse {
    pub quiz_id: i64,
    pub quiz_title: String,
    pub user_id: i64,
    pub score: i32,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub results: Vec<AnswerBreakdown>,
}
