// src/scoring.rs

use std::collections::HashMap;

use crate::models::answer::AnswerSubmission;
use crate::models::quiz::{QuestionKind, QuestionWithOptions};

/// One submitted answer with its computed correctness.
#[derive(Debug, Clone)]
pub struct ScoredAnswer {
    pub question_id: i64,
    pub option_id: Option<i64>,
    pub text_answer: Option<String>,
    pub is_correct: bool,
}

/// Outcome of scoring one submission against the authoritative
/// question/option data.
#[derive(Debug, Clone)]
pub struct ScoreSummary {
    pub answers: Vec<ScoredAnswer>,
    pub correct_answers: i64,
    pub total_questions: i64,
    /// Integer percentage, 0..=100.
    pub score: i32,
}

/// Scores a submission. Pure: no storage access, no side effects.
/// Shared by the online-attempt write path and the own-results read path.
///
/// An answer is correct only when its question is MCQ and the submitted
/// option id equals the id of the option flagged correct for that question
/// (first flagged option is authoritative). Descriptive answers are never
/// auto-graded. The percentage denominator is the quiz's full question
/// count, so an incomplete submission is scored against the whole quiz.
///
/// At most one answer counts per question: a duplicate question id in the
/// batch replaces the earlier answer, so the score stays within 0..=100.
pub fn score_submission(
    questions: &[QuestionWithOptions],
    submitted: &[AnswerSubmission],
) -> ScoreSummary {
    let by_id: HashMap<i64, &QuestionWithOptions> = questions
        .iter()
        .map(|q| (q.question.id, q))
        .collect();

    let mut index_of: HashMap<i64, usize> = HashMap::new();
    let mut answers: Vec<ScoredAnswer> = Vec::with_capacity(submitted.len());
    for ans in submitted {
        let is_correct = by_id.get(&ans.question_id).is_some_and(|q| {
            q.question.kind == QuestionKind::Mcq
                && ans.option_id.is_some()
                && q.correct_option().map(|o| o.id) == ans.option_id
        });
        let scored = ScoredAnswer {
            question_id: ans.question_id,
            option_id: ans.option_id,
            text_answer: ans.text_answer.clone(),
            is_correct,
        };
        match index_of.get(&ans.question_id) {
            Some(&idx) => answers[idx] = scored,
            None => {
                index_of.insert(ans.question_id, answers.len());
                answers.push(scored);
            }
        }
    }

    let correct_answers = answers.iter().filter(|a| a.is_correct).count() as i64;
    let total_questions = questions.len() as i64;
    ScoreSummary {
        answers,
        correct_answers,
        total_questions,
        score: percentage(correct_answers, total_questions),
    }
}

/// round(correct / total * 100); 0 when the quiz has no questions.
pub fn percentage(correct: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{Question, QuizOption};

    fn mcq(id: i64, options: &[(i64, bool)]) -> QuestionWithOptions {
        QuestionWithOptions {
            question: Question {
                id,
                quiz_id: 1,
                text: format!("Question {id}"),
                kind: QuestionKind::Mcq,
                order: id as i32,
            },
            options: options
                .iter()
                .map(|&(opt_id, is_correct)| QuizOption {
                    id: opt_id,
                    question_id: id,
                    text: format!("Option {opt_id}"),
                    is_correct,
                })
                .collect(),
        }
    }

    fn descriptive(id: i64) -> QuestionWithOptions {
        QuestionWithOptions {
            question: Question {
                id,
                quiz_id: 1,
                text: format!("Question {id}"),
                kind: QuestionKind::Descriptive,
                order: id as i32,
            },
            options: vec![],
        }
    }

    fn pick(question_id: i64, option_id: i64) -> AnswerSubmission {
        AnswerSubmission {
            question_id,
            option_id: Some(option_id),
            text_answer: None,
        }
    }

    // Two MCQ questions; Q1 correct option 10, Q2 correct option 21.
    fn two_question_quiz() -> Vec<QuestionWithOptions> {
        vec![mcq(1, &[(10, true), (11, false)]), mcq(2, &[(20, false), (21, true)])]
    }

    #[test]
    fn one_of_two_correct_scores_fifty() {
        let quiz = two_question_quiz();
        let summary = score_submission(&quiz, &[pick(1, 10), pick(2, 20)]);
        assert_eq!(summary.score, 50);
        assert_eq!(summary.correct_answers, 1);
        assert_eq!(summary.total_questions, 2);
        assert!(summary.answers[0].is_correct);
        assert!(!summary.answers[1].is_correct);
    }

    #[test]
    fn all_correct_scores_hundred() {
        let quiz = two_question_quiz();
        let summary = score_submission(&quiz, &[pick(1, 10), pick(2, 21)]);
        assert_eq!(summary.score, 100);
        assert_eq!(summary.correct_answers, 2);
    }

    #[test]
    fn empty_submission_scores_zero() {
        let quiz = two_question_quiz();
        let summary = score_submission(&quiz, &[]);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.correct_answers, 0);
        assert_eq!(summary.total_questions, 2);
    }

    #[test]
    fn incomplete_submission_uses_full_quiz_as_denominator() {
        let quiz = vec![
            mcq(1, &[(10, true)]),
            mcq(2, &[(20, true)]),
            mcq(3, &[(30, true)]),
        ];
        // One correct answer out of three questions: round(1/3 * 100) = 33.
        let summary = score_submission(&quiz, &[pick(1, 10)]);
        assert_eq!(summary.score, 33);
    }

    #[test]
    fn descriptive_answers_are_never_auto_graded() {
        let quiz = vec![mcq(1, &[(10, true)]), descriptive(2)];
        let submitted = [
            pick(1, 10),
            AnswerSubmission {
                question_id: 2,
                option_id: None,
                text_answer: Some("The water evaporates.".to_string()),
            },
        ];
        let summary = score_submission(&quiz, &submitted);
        assert!(!summary.answers[1].is_correct);
        assert_eq!(summary.correct_answers, 1);
        assert_eq!(summary.score, 50);
    }

    #[test]
    fn answer_without_option_id_is_incorrect_for_mcq() {
        let quiz = vec![mcq(1, &[(10, true)])];
        let summary = score_submission(
            &quiz,
            &[AnswerSubmission {
                question_id: 1,
                option_id: None,
                text_answer: None,
            }],
        );
        assert!(!summary.answers[0].is_correct);
        assert_eq!(summary.score, 0);
    }

    #[test]
    fn answer_for_unknown_question_is_incorrect() {
        let quiz = vec![mcq(1, &[(10, true)])];
        let summary = score_submission(&quiz, &[pick(99, 10)]);
        assert!(!summary.answers[0].is_correct);
        assert_eq!(summary.score, 0);
    }

    #[test]
    fn duplicate_question_ids_count_once_and_last_answer_wins() {
        let quiz = two_question_quiz();
        // Same correct answer repeated three times still scores one
        // question out of two, never above 100.
        let summary = score_submission(&quiz, &[pick(1, 10), pick(1, 10), pick(1, 10)]);
        assert_eq!(summary.correct_answers, 1);
        assert_eq!(summary.score, 50);
        assert_eq!(summary.answers.len(), 1);

        // A later answer to the same question replaces the earlier one.
        let summary = score_submission(&quiz, &[pick(1, 10), pick(1, 11)]);
        assert_eq!(summary.correct_answers, 0);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.answers.len(), 1);
        assert_eq!(summary.answers[0].option_id, Some(11));
    }

    #[test]
    fn first_flagged_option_is_authoritative() {
        // Two flagged options should not occur, but if the data has them
        // the first in insertion order wins.
        let quiz = vec![mcq(1, &[(10, true), (11, true)])];
        let first = score_submission(&quiz, &[pick(1, 10)]);
        assert!(first.answers[0].is_correct);
        let second = score_submission(&quiz, &[pick(1, 11)]);
        assert!(!second.answers[0].is_correct);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(0, 0), 0);
    }
}
