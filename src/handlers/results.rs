// src/handlers/results.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        answer::{AnswerBreakdown, AnswerSubmission, OwnResultsResponse},
        attempt::CreatorResultsResponse,
        quiz::{QuestionKind, QuestionWithOptions},
    },
    repository::QuizRepository,
    scoring,
    utils::jwt::Claims,
};

const NEEDS_GRADING: &str = "(Descriptive - Needs Grading)";

/// The authenticated taker's own results: their Answer rows joined against
/// the current question/option data and scored with the shared engine.
///
/// Answers accumulate across submissions, so only the latest answer per
/// question counts; earlier rows are superseded at read time.
pub async fn get_own_results(
    State(repo): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let aggregate = repo
        .fetch_quiz_aggregate(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found", quiz_id)))?;

    let rows = repo.fetch_user_answers(quiz_id, user_id).await?;

    // Rows arrive in insertion order; later rows overwrite earlier ones.
    let mut latest: HashMap<i64, AnswerSubmission> = HashMap::new();
    for row in rows {
        latest.insert(
            row.question_id,
            AnswerSubmission {
                question_id: row.question_id,
                option_id: row.option_id,
                text_answer: row.text_answer,
            },
        );
    }

    // Answered questions in quiz display order.
    let answered: Vec<AnswerSubmission> = aggregate
        .questions
        .iter()
        .filter_map(|q| latest.remove(&q.question.id))
        .collect();

    let summary = scoring::score_submission(&aggregate.questions, &answered);

    let by_id: HashMap<i64, &QuestionWithOptions> = aggregate
        .questions
        .iter()
        .map(|q| (q.question.id, q))
        .collect();

    let results = summary
        .answers
        .iter()
        .filter_map(|scored| {
            let question = by_id.get(&scored.question_id)?;
            let user_answer = match scored.option_id {
                Some(option_id) => question
                    .options
                    .iter()
                    .find(|o| o.id == option_id)
                    .map(|o| o.text.clone()),
                None => scored.text_answer.clone(),
            };
            let correct_answer = if question.question.kind == QuestionKind::Mcq {
                question
                    .correct_option()
                    .map(|o| o.text.clone())
                    .unwrap_or_default()
            } else {
                NEEDS_GRADING.to_string()
            };
            Some(AnswerBreakdown {
                question_id: scored.question_id,
                question_text: question.question.text.clone(),
                question_kind: question.question.kind,
                user_answer,
                correct_answer,
                is_correct: scored.is_correct,
            })
        })
        .collect();

    Ok(Json(OwnResultsResponse {
        quiz_id,
        quiz_title: aggregate.quiz.title,
        user_id,
        score: summary.score,
        total_questions: summary.total_questions,
        correct_answers: summary.correct_answers,
        results,
    }))
}

/// Every attempt for a quiz, newest first, with student identities.
/// Creator only: any other requester gets 403 even for a valid quiz.
pub async fn get_creator_results(
    State(repo): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = repo
        .fetch_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz with ID {} not found", quiz_id)))?;

    if quiz.creator_id != claims.user_id()? {
        return Err(AppError::Forbidden(
            "You are not authorized to view the results for this quiz".to_string(),
        ));
    }

    let attempts = repo.list_attempts(quiz_id).await?;

    Ok(Json(CreatorResultsResponse {
        quiz_id,
        quiz_title: quiz.title,
        is_online_attempt: quiz.is_online_attempt,
        attempts,
    }))
}
