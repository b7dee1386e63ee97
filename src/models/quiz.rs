// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Quiz kind: MCQ-only, descriptive-only, or a mix of both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quiz_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum QuizKind {
    Mcq,
    Descriptive,
    Mixed,
}

/// Question kind. Only MCQ questions carry options and are auto-scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionKind {
    Mcq,
    Descriptive,
}

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: QuizKind,
    pub time_limit_minutes: Option<i32>,
    pub randomize_questions: bool,
    pub is_online_attempt: bool,
    pub creator_id: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub kind: QuestionKind,

    /// Display position within the quiz, ascending. Unique per quiz but
    /// not required to be contiguous.
    /// Mapped from the column 'display_order' since `order` is reserved in SQL.
    #[sqlx(rename = "display_order")]
    pub order: i32,
}

/// Represents the 'options' table in the database.
/// Carries the answer key; must never reach a taker unfiltered.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// A question together with its options, in display order.
#[derive(Debug, Clone)]
pub struct QuestionWithOptions {
    pub question: Question,
    pub options: Vec<QuizOption>,
}

impl QuestionWithOptions {
    /// The authoritative correct option for an MCQ question.
    /// If the data carries more than one flagged option (a builder-invariant
    /// violation), the first in insertion order wins.
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

/// The full quiz aggregate: quiz row plus questions and options.
#[derive(Debug, Clone)]
pub struct QuizAggregate {
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithOptions>,
}

// --- Create DTOs ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must not be empty."),
        custom(function = validate_not_blank)
    )]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub kind: QuizKind,
    #[validate(range(min = 1))]
    pub time_limit_minutes: Option<i32>,
    #[serde(default)]
    pub randomize_questions: bool,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<CreateQuestionInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateQuestionInput {
    pub text: String,
    pub kind: QuestionKind,
    pub order: i32,
    #[serde(default)]
    pub options: Vec<CreateOptionInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOptionInput {
    pub text: String,
    pub is_correct: bool,
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("title_blank"));
    }
    Ok(())
}

/// Checks all question-level constraints before anything is written:
/// non-empty list, non-empty texts, non-negative order unique within the
/// quiz, and for every MCQ question a non-empty option list with at least
/// one correct option.
fn validate_questions(questions: &[CreateQuestionInput]) -> Result<(), validator::ValidationError> {
    if questions.is_empty() {
        return Err(validator::ValidationError::new("questions_cannot_be_empty"));
    }
    let mut seen_orders = std::collections::HashSet::new();
    for q in questions {
        if q.text.trim().is_empty() {
            return Err(validator::ValidationError::new("question_text_empty"));
        }
        if q.order < 0 {
            return Err(validator::ValidationError::new("question_order_negative"));
        }
        if !seen_orders.insert(q.order) {
            return Err(validator::ValidationError::new("question_order_duplicate"));
        }
        if q.kind == QuestionKind::Mcq {
            if q.options.is_empty() {
                return Err(validator::ValidationError::new("mcq_options_empty"));
            }
            if q.options.iter().any(|o| o.text.trim().is_empty()) {
                return Err(validator::ValidationError::new("option_text_empty"));
            }
            if !q.options.iter().any(|o| o.is_correct) {
                return Err(validator::ValidationError::new("mcq_missing_correct_option"));
            }
        }
    }
    Ok(())
}

// --- Response DTOs ---

/// Full creator-facing view of a quiz, answer key included.
#[derive(Debug, Serialize)]
pub struct QuizDetailResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: QuizKind,
    pub time_limit_minutes: Option<i32>,
    pub randomize_questions: bool,
    pub is_online_attempt: bool,
    pub creator_id: i64,
    pub questions: Vec<QuestionDetail>,
}

#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    pub id: i64,
    pub text: String,
    pub kind: QuestionKind,
    pub order: i32,
    pub options: Vec<OptionDetail>,
}

#[derive(Debug, Serialize)]
pub struct OptionDetail {
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
}

impl From<QuizAggregate> for QuizDetailResponse {
    fn from(agg: QuizAggregate) -> Self {
        let questions = agg
            .questions
            .into_iter()
            .map(|q| QuestionDetail {
                id: q.question.id,
                text: q.question.text,
                kind: q.question.kind,
                order: q.question.order,
                options: q
                    .options
                    .into_iter()
                    .map(|o| OptionDetail {
                        id: o.id,
                        text: o.text,
                        is_correct: o.is_correct,
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: agg.quiz.id,
            title: agg.quiz.title,
            description: agg.quiz.description,
            kind: agg.quiz.kind,
            time_limit_minutes: agg.quiz.time_limit_minutes,
            randomize_questions: agg.quiz.randomize_questions,
            is_online_attempt: agg.quiz.is_online_attempt,
            creator_id: agg.quiz.creator_id,
            questions,
        }
    }
}

/// Taker-facing view of a quiz. Options expose exactly {id, text};
/// the answer key is stripped by the type, not by a flag.
#[derive(Debug, Serialize)]
pub struct TakerQuizResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: QuizKind,
    pub time_limit_minutes: Option<i32>,
    pub randomize_questions: bool,
    pub is_online_attempt: bool,
    pub questions: Vec<TakerQuestion>,
}

#[derive(Debug, Serialize)]
pub struct TakerQuestion {
    pub id: i64,
    pub text: String,
    pub kind: QuestionKind,
    pub order: i32,
    pub options: Vec<TakerOption>,
}

#[derive(Debug, Serialize)]
pub struct TakerOption {
    pub id: i64,
    pub text: String,
}

impl From<QuizAggregate> for TakerQuizResponse {
    fn from(agg: QuizAggregate) -> Self {
        let questions = agg
            .questions
            .into_iter()
            .map(|q| TakerQuestion {
                id: q.question.id,
                text: q.question.text,
                kind: q.question.kind,
                order: q.question.order,
                options: q
                    .options
                    .into_iter()
                    .map(|o| TakerOption {
                        id: o.id,
                        text: o.text,
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: agg.quiz.id,
            title: agg.quiz.title,
            description: agg.quiz.description,
            kind: agg.quiz.kind,
            time_limit_minutes: agg.quiz.time_limit_minutes,
            randomize_questions: agg.quiz.randomize_questions,
            is_online_attempt: agg.quiz.is_online_attempt,
            questions,
        }
    }
}

/// One row of the quiz listing, with its question count.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizListItem {
    pub id: i64,
    pub title: String,
    pub kind: QuizKind,
    pub is_online_attempt: bool,
    pub question_count: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq_question(options: Vec<CreateOptionInput>) -> CreateQuestionInput {
        CreateQuestionInput {
            text: "What is the capital of France?".to_string(),
            kind: QuestionKind::Mcq,
            order: 0,
            options,
        }
    }

    fn request_with(questions: Vec<CreateQuestionInput>) -> CreateQuizRequest {
        CreateQuizRequest {
            title: "Geography".to_string(),
            description: None,
            kind: QuizKind::Mcq,
            time_limit_minutes: None,
            randomize_questions: false,
            questions,
        }
    }

    #[test]
    fn accepts_mcq_with_a_correct_option() {
        let req = request_with(vec![mcq_question(vec![
            CreateOptionInput {
                text: "Paris".to_string(),
                is_correct: true,
            },
            CreateOptionInput {
                text: "Lyon".to_string(),
                is_correct: false,
            },
        ])]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_mcq_without_a_correct_option() {
        let req = request_with(vec![mcq_question(vec![
            CreateOptionInput {
                text: "Paris".to_string(),
                is_correct: false,
            },
            CreateOptionInput {
                text: "Lyon".to_string(),
                is_correct: false,
            },
        ])]);
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("mcq_missing_correct_option"), "got: {err}");
    }

    #[test]
    fn rejects_mcq_without_options() {
        let req = request_with(vec![mcq_question(vec![])]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_empty_question_list() {
        let req = request_with(vec![]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_empty_title() {
        let mut req = request_with(vec![mcq_question(vec![CreateOptionInput {
            text: "Paris".to_string(),
            is_correct: true,
        }])]);
        req.title = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_blank_title() {
        let mut req = request_with(vec![mcq_question(vec![CreateOptionInput {
            text: "Paris".to_string(),
            is_correct: true,
        }])]);
        req.title = "   ".to_string();
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("title_blank"), "got: {err}");
    }

    #[test]
    fn rejects_duplicate_question_order() {
        let first = mcq_question(vec![CreateOptionInput {
            text: "Paris".to_string(),
            is_correct: true,
        }]);
        let second = mcq_question(vec![CreateOptionInput {
            text: "4".to_string(),
            is_correct: true,
        }]);
        // Both helpers produce order 0.
        let req = request_with(vec![first, second]);
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("question_order_duplicate"), "got: {err}");
    }

    #[test]
    fn rejects_negative_question_order() {
        let mut question = mcq_question(vec![CreateOptionInput {
            text: "Paris".to_string(),
            is_correct: true,
        }]);
        question.order = -1;
        let req = request_with(vec![question]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn descriptive_question_needs_no_options() {
        let req = request_with(vec![CreateQuestionInput {
            text: "Explain the water cycle.".to_string(),
            kind: QuestionKind::Descriptive,
            order: 0,
            options: vec![],
        }]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn taker_projection_strips_answer_key() {
        let agg = QuizAggregate {
            quiz: Quiz {
                id: 1,
                title: "Geography".to_string(),
                description: None,
                kind: QuizKind::Mcq,
                time_limit_minutes: Some(10),
                randomize_questions: false,
                is_online_attempt: true,
                creator_id: 7,
                created_at: None,
            },
            questions: vec![QuestionWithOptions {
                question: Question {
                    id: 11,
                    quiz_id: 1,
                    text: "Capital of France?".to_string(),
                    kind: QuestionKind::Mcq,
                    order: 0,
                },
                options: vec![QuizOption {
                    id: 21,
                    question_id: 11,
                    text: "Paris".to_string(),
                    is_correct: true,
                }],
            }],
        };

        let json = serde_json::to_value(TakerQuizResponse::from(agg)).unwrap();
        let serialized = json.to_string();
        assert!(!serialized.contains("is_correct"));
        assert!(!serialized.contains("isCorrect"));
        assert_eq!(json["questions"][0]["options"][0]["id"], 21);
        assert_eq!(json["questions"][0]["options"][0]["text"], "Paris");
    }
}
