// src/repository.rs

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::{
        answer::{Answer, AnswerSubmission},
        attempt::{AttemptSummary, QuizAttempt, QuizStudent},
        quiz::{
            CreateQuizRequest, Question, QuestionKind, QuestionWithOptions, Quiz, QuizAggregate,
            QuizKind, QuizListItem, QuizOption,
        },
        user::User,
    },
    scoring::ScoredAnswer,
};

/// Durable storage for quizzes, questions, options, answers, attempts and
/// student identities. Owns the connection pool; constructed once at startup
/// and handed to the handlers through application state.
#[derive(Clone)]
pub struct QuizRepository {
    pool: PgPool,
}

impl QuizRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // --- Users (authentication collaborator) ---

    pub async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password, role, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // Postgres unique violation
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict(format!("Username '{}' already exists", username))
            }
            _ => AppError::from(e),
        })
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // --- Quiz aggregate ---

    /// Persists a quiz together with all its questions and options as one
    /// atomic unit. A reader can never observe a quiz without its children;
    /// on any failure the transaction rolls back and nothing is left behind.
    pub async fn create_quiz(
        &self,
        creator_id: i64,
        kind: QuizKind,
        is_online_attempt: bool,
        req: &CreateQuizRequest,
    ) -> Result<QuizAggregate, AppError> {
        let mut tx = self.pool.begin().await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes
                (title, description, kind, time_limit_minutes,
                 randomize_questions, is_online_attempt, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, kind, time_limit_minutes,
                      randomize_questions, is_online_attempt, creator_id, created_at
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(kind)
        .bind(req.time_limit_minutes)
        .bind(req.randomize_questions)
        .bind(is_online_attempt)
        .bind(creator_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut questions = Vec::with_capacity(req.questions.len());
        for q in &req.questions {
            let question = sqlx::query_as::<_, Question>(
                r#"
                INSERT INTO questions (quiz_id, text, kind, display_order)
                VALUES ($1, $2, $3, $4)
                RETURNING id, quiz_id, text, kind, display_order
                "#,
            )
            .bind(quiz.id)
            .bind(&q.text)
            .bind(q.kind)
            .bind(q.order)
            .fetch_one(&mut *tx)
            .await?;

            // Options are only meaningful for MCQ questions.
            let options = if q.kind == QuestionKind::Mcq && !q.options.is_empty() {
                let mut builder = QueryBuilder::<Postgres>::new(
                    "INSERT INTO options (question_id, text, is_correct) ",
                );
                builder.push_values(&q.options, |mut b, opt| {
                    b.push_bind(question.id)
                        .push_bind(opt.text.clone())
                        .push_bind(opt.is_correct);
                });
                builder.push(" RETURNING id, question_id, text, is_correct");
                builder
                    .build_query_as::<QuizOption>()
                    .fetch_all(&mut *tx)
                    .await?
            } else {
                Vec::new()
            };

            questions.push(QuestionWithOptions { question, options });
        }

        tx.commit().await?;

        Ok(QuizAggregate { quiz, questions })
    }

    pub async fn fetch_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, description, kind, time_limit_minutes,
                   randomize_questions, is_online_attempt, creator_id, created_at
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    /// Loads the full aggregate: quiz, questions in ascending display order,
    /// options in insertion order.
    pub async fn fetch_quiz_aggregate(
        &self,
        quiz_id: i64,
    ) -> Result<Option<QuizAggregate>, AppError> {
        let Some(quiz) = self.fetch_quiz(quiz_id).await? else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, quiz_id, text, kind, display_order
            FROM questions
            WHERE quiz_id = $1
            ORDER BY display_order ASC, id ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let option_rows = sqlx::query_as::<_, QuizOption>(
            r#"
            SELECT id, question_id, text, is_correct
            FROM options
            WHERE question_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(&question_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<i64, Vec<QuizOption>> = HashMap::new();
        for opt in option_rows {
            by_question.entry(opt.question_id).or_default().push(opt);
        }

        let questions = questions
            .into_iter()
            .map(|question| {
                let options = by_question.remove(&question.id).unwrap_or_default();
                QuestionWithOptions { question, options }
            })
            .collect();

        Ok(Some(QuizAggregate { quiz, questions }))
    }

    /// Lists a creator's quizzes with question counts, newest first.
    pub async fn list_quizzes(&self, creator_id: i64) -> Result<Vec<QuizListItem>, AppError> {
        let items = sqlx::query_as::<_, QuizListItem>(
            r#"
            SELECT q.id, q.title, q.kind, q.is_online_attempt,
                   COUNT(qs.id) AS question_count, q.created_at
            FROM quizzes q
            LEFT JOIN questions qs ON qs.quiz_id = q.id
            WHERE q.creator_id = $1
            GROUP BY q.id
            ORDER BY q.created_at DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // --- Student identity ---

    /// Resolves an anonymous taker to a stable identity within a quiz.
    /// A single upsert keyed on the (quiz_id, enrollment_number) unique
    /// constraint, so concurrent first-time submissions under the same
    /// enrollment number cannot create two rows. On conflict only the
    /// display fields are refreshed; the id is preserved.
    pub async fn upsert_student(
        &self,
        quiz_id: i64,
        name: &str,
        enrollment_number: &str,
        email: Option<&str>,
    ) -> Result<QuizStudent, AppError> {
        let student = sqlx::query_as::<_, QuizStudent>(
            r#"
            INSERT INTO quiz_students (quiz_id, name, enrollment_number, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (quiz_id, enrollment_number) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email
            RETURNING id, quiz_id, name, enrollment_number, email
            "#,
        )
        .bind(quiz_id)
        .bind(name)
        .bind(enrollment_number)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(student)
    }

    // --- Attempts (anonymous flow) ---

    /// Persists one attempt and its scored answers atomically.
    pub async fn insert_attempt(
        &self,
        quiz_id: i64,
        student_id: i64,
        score: i32,
        answers: &[ScoredAnswer],
    ) -> Result<QuizAttempt, AppError> {
        let mut tx = self.pool.begin().await?;

        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (quiz_id, student_id, score)
            VALUES ($1, $2, $3)
            RETURNING id, quiz_id, student_id, score, completed_at
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .bind(score)
        .fetch_one(&mut *tx)
        .await?;

        if !answers.is_empty() {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO attempt_answers (attempt_id, question_id, option_id, text_answer, is_correct) ",
            );
            builder.push_values(answers, |mut b, ans| {
                b.push_bind(attempt.id)
                    .push_bind(ans.question_id)
                    .push_bind(ans.option_id)
                    .push_bind(ans.text_answer.clone())
                    .push_bind(ans.is_correct);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        Ok(attempt)
    }

    /// Every attempt for a quiz with the student identity and answer count,
    /// newest first.
    pub async fn list_attempts(&self, quiz_id: i64) -> Result<Vec<AttemptSummary>, AppError> {
        let attempts = sqlx::query_as::<_, AttemptSummary>(
            r#"
            SELECT a.id AS attempt_id, a.student_id, s.name AS student_name,
                   s.enrollment_number, s.email, a.score, a.completed_at,
                   COUNT(aa.id) AS answer_count
            FROM quiz_attempts a
            JOIN quiz_students s ON s.id = a.student_id
            LEFT JOIN attempt_answers aa ON aa.attempt_id = a.id
            WHERE a.quiz_id = $1
            GROUP BY a.id, s.id
            ORDER BY a.completed_at DESC, a.id DESC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    // --- Answers (authenticated flow) ---

    /// Persists one Answer row per submitted tuple in a single transaction,
    /// denormalizing the quiz id onto each row. No correctness is stored;
    /// scoring happens when results are read.
    pub async fn insert_answers(
        &self,
        quiz_id: i64,
        user_id: i64,
        answers: &[AnswerSubmission],
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO answers (quiz_id, question_id, user_id, option_id, text_answer) ",
        );
        builder.push_values(answers, |mut b, ans| {
            b.push_bind(quiz_id)
                .push_bind(ans.question_id)
                .push_bind(user_id)
                .push_bind(ans.option_id)
                .push_bind(ans.text_answer.clone());
        });
        let inserted = builder.build().execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;

        Ok(inserted)
    }

    /// A user's answers for a quiz in insertion order, so a later
    /// resubmission of the same question supersedes the earlier row when
    /// results are aggregated.
    pub async fn fetch_user_answers(
        &self,
        quiz_id: i64,
        user_id: i64,
    ) -> Result<Vec<Answer>, AppError> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, quiz_id, question_id, user_id, option_id, text_answer, created_at
            FROM answers
            WHERE quiz_id = $1 AND user_id = $2
            ORDER BY id ASC
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }
}
