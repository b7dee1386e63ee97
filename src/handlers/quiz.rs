// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::{
        CreateQuizRequest, QuestionKind, QuizDetailResponse, QuizKind, TakerQuizResponse,
    },
    repository::QuizRepository,
    utils::jwt::Claims,
};

/// Creates a quiz with its questions and options as one atomic unit.
///
/// All constraints (non-empty title, non-empty questions, every MCQ
/// question carrying a correct option) are checked before any write;
/// a violation leaves no partial state behind.
pub async fn create_quiz(
    State(repo): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let creator_id = claims.user_id()?;
    let aggregate = repo
        .create_quiz(creator_id, payload.kind, false, &payload)
        .await?;

    tracing::info!(quiz_id = aggregate.quiz.id, creator_id, "quiz created");

    Ok((StatusCode::CREATED, Json(QuizDetailResponse::from(aggregate))))
}

/// Creates an online quiz: is_online_attempt is forced true and the quiz
/// kind is forced to MCQ, since anonymous attempts are MCQ-only.
pub async fn create_online_quiz(
    State(repo): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload
        .questions
        .iter()
        .any(|q| q.kind != QuestionKind::Mcq)
    {
        return Err(AppError::Validation(
            "Online quizzes may only contain MCQ questions".to_string(),
        ));
    }

    let creator_id = claims.user_id()?;
    let aggregate = repo
        .create_quiz(creator_id, QuizKind::Mcq, true, &payload)
        .await?;

    tracing::info!(quiz_id = aggregate.quiz.id, creator_id, "online quiz created");

    Ok((StatusCode::CREATED, Json(QuizDetailResponse::from(aggregate))))
}

/// Lists the requesting creator's quizzes with question counts, newest first.
pub async fn list_quizzes(
    State(repo): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let creator_id = claims.user_id()?;
    let quizzes = repo.list_quizzes(creator_id).await?;

    Ok(Json(quizzes))
}

/// Full quiz view including the answer key. Creator only.
pub async fn get_quiz(
    State(repo): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let aggregate = repo
        .fetch_quiz_aggregate(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found", quiz_id)))?;

    if aggregate.quiz.creator_id != claims.user_id()? {
        return Err(AppError::Forbidden(
            "You are not authorized to view this quiz".to_string(),
        ));
    }

    Ok(Json(QuizDetailResponse::from(aggregate)))
}

/// Taker-facing quiz view for the authenticated flow. The answer key is
/// stripped unconditionally by the projection type.
pub async fn get_quiz_for_taker(
    State(repo): State<QuizRepository>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let aggregate = repo
        .fetch_quiz_aggregate(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found", quiz_id)))?;

    Ok(Json(TakerQuizResponse::from(aggregate)))
}

/// Taker-facing view of an online quiz, served without authentication.
/// The quiz must be flagged for online attempts.
pub async fn get_online_quiz(
    State(repo): State<QuizRepository>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let aggregate = repo
        .fetch_quiz_aggregate(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found", quiz_id)))?;

    if !aggregate.quiz.is_online_attempt {
        return Err(AppError::Conflict(
            "This quiz is not configured for online attempts".to_string(),
        ));
    }

    Ok(Json(TakerQuizResponse::from(aggregate)))
}
