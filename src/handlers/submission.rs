// src/handlers/submission.rs

use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        answer::{AnswerSubmission, SubmitAnswersRequest},
        attempt::{AttemptReceipt, OnlineSubmissionRequest},
        quiz::QuizAggregate,
    },
    repository::QuizRepository,
    scoring,
    utils::jwt::Claims,
};

/// Rejects a batch in which any answer references a question outside the
/// quiz. Nothing from such a batch may be persisted.
fn check_answers_belong_to_quiz(
    aggregate: &QuizAggregate,
    answers: &[AnswerSubmission],
) -> Result<(), AppError> {
    let known: HashSet<i64> = aggregate.questions.iter().map(|q| q.question.id).collect();
    if let Some(stray) = answers.iter().find(|a| !known.contains(&a.question_id)) {
        return Err(AppError::Validation(format!(
            "Question {} does not belong to quiz {}",
            stray.question_id, aggregate.quiz.id
        )));
    }
    Ok(())
}

/// Authenticated submission: one Answer row per tuple, written in a single
/// transaction with the quiz id denormalized. Correctness is not computed
/// here; it is derived when results are read. Repeated calls append.
pub async fn submit_answers(
    State(repo): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user_id = claims.user_id()?;
    let aggregate = repo
        .fetch_quiz_aggregate(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found", quiz_id)))?;

    check_answers_belong_to_quiz(&aggregate, &payload.answers)?;

    let submitted = repo
        .insert_answers(quiz_id, user_id, &payload.answers)
        .await?;

    tracing::info!(quiz_id, user_id, submitted, "answers submitted");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "quiz_id": quiz_id,
            "submitted": submitted,
            "message": "Answers submitted successfully"
        })),
    ))
}

/// Anonymous online-attempt submission.
///
/// Resolves the student identity by enrollment number, scores the answers
/// against the authoritative question set, then persists the attempt with
/// its scored answers atomically.
pub async fn submit_online_attempt(
    State(repo): State<QuizRepository>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<OnlineSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let aggregate = repo
        .fetch_quiz_aggregate(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found", quiz_id)))?;

    if !aggregate.quiz.is_online_attempt {
        return Err(AppError::Conflict(
            "This quiz is not configured for online attempts".to_string(),
        ));
    }

    check_answers_belong_to_quiz(&aggregate, &payload.answers)?;

    let student = repo
        .upsert_student(
            quiz_id,
            &payload.student_name,
            &payload.enrollment_number,
            payload.email.as_deref(),
        )
        .await?;

    let summary = scoring::score_submission(&aggregate.questions, &payload.answers);

    let attempt = repo
        .insert_attempt(quiz_id, student.id, summary.score, &summary.answers)
        .await?;

    tracing::info!(
        quiz_id,
        student_id = student.id,
        attempt_id = attempt.id,
        score = summary.score,
        "online attempt recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(AttemptReceipt {
            attempt_id: attempt.id,
            quiz_id,
            student_id: student.id,
            student_name: student.name,
            enrollment_number: student.enrollment_number,
            score: summary.score,
            total_questions: summary.total_questions,
            correct_answers: summary.correct_answers,
            completed_at: attempt.completed_at,
        }),
    ))
}
