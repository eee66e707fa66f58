// src/repository/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{AttemptRepository, ContentStore, RepositoryError, StatisticsRepository};
use crate::models::{
    attempt::{AttemptCompletion, QuizAttempt, UserAnswer},
    quiz::{Choice, ChoiceRow, Question, QuestionRow, Quiz, QuizRow},
    user::UserStatistics,
};

const ATTEMPT_COLUMNS: &str =
    "id, quiz_id, user_id, started_at, completed_at, score, total_questions";

/// sqlx-backed storage for quizzes, attempts and user statistics.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PostgresStore {
    async fn fetch_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, RepositoryError> {
        let quiz = sqlx::query_as::<_, QuizRow>(
            "SELECT id, title, is_active, owner_id FROM quizzes WHERE id = $1",
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(quiz) = quiz else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, text, explanation, image_url
            FROM questions
            WHERE quiz_id = $1
            ORDER BY id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        let mut choices_by_question: HashMap<i64, Vec<Choice>> = HashMap::new();
        if !questions.is_empty() {
            // Dynamic IN clause over the quiz's question ids
            let mut query_builder = QueryBuilder::<Postgres>::new(
                "SELECT id, question_id, text, is_correct FROM choices WHERE question_id IN (",
            );
            let mut separated = query_builder.separated(",");
            for q in &questions {
                separated.push_bind(q.id);
            }
            separated.push_unseparated(") ORDER BY id");

            let rows: Vec<ChoiceRow> = query_builder
                .build_query_as()
                .fetch_all(&self.pool)
                .await?;

            for row in rows {
                choices_by_question
                    .entry(row.question_id)
                    .or_default()
                    .push(Choice {
                        id: row.id,
                        text: row.text,
                        is_correct: row.is_correct,
                    });
            }
        }

        let questions = questions
            .into_iter()
            .map(|q| Question {
                choices: choices_by_question.remove(&q.id).unwrap_or_default(),
                id: q.id,
                text: q.text,
                explanation: q.explanation,
                image_url: q.image_url,
            })
            .collect();

        Ok(Some(Quiz {
            id: quiz.id,
            title: quiz.title,
            is_active: quiz.is_active,
            owner_id: quiz.owner_id,
            questions,
        }))
    }
}

#[async_trait]
impl AttemptRepository for PostgresStore {
    async fn create_attempt(
        &self,
        quiz_id: i64,
        user_id: i64,
        started_at: DateTime<Utc>,
    ) -> Result<QuizAttempt, RepositoryError> {
        let sql = format!(
            "INSERT INTO quiz_attempts (quiz_id, user_id, started_at, score, total_questions) \
             VALUES ($1, $2, $3, 0, 0) RETURNING {ATTEMPT_COLUMNS}"
        );
        let attempt = sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(quiz_id)
            .bind(user_id)
            .bind(started_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(attempt)
    }

    async fn find_attempt(&self, attempt_id: i64) -> Result<Option<QuizAttempt>, RepositoryError> {
        let sql = format!("SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts WHERE id = $1");
        let attempt = sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(attempt_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(attempt)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, RepositoryError> {
        let sql = format!(
            "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts \
             WHERE user_id = $1 ORDER BY started_at DESC, id DESC"
        );
        let list = sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(list)
    }

    async fn list_completed_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<QuizAttempt>, RepositoryError> {
        let sql = format!(
            "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts \
             WHERE user_id = $1 AND completed_at IS NOT NULL"
        );
        let list = sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(list)
    }

    async fn list_completed_by_quiz(
        &self,
        quiz_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<QuizAttempt>, RepositoryError> {
        // LIMIT NULL means no limit in Postgres
        let sql = format!(
            "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts \
             WHERE quiz_id = $1 AND completed_at IS NOT NULL \
             ORDER BY score DESC, (completed_at - started_at) ASC, id ASC \
             LIMIT $2"
        );
        let list = sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(quiz_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(list)
    }

    async fn complete_attempt(
        &self,
        attempt_id: i64,
        completion: AttemptCompletion,
    ) -> Result<Option<QuizAttempt>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken here serializes concurrent submissions; the loser
        // re-evaluates `completed_at IS NULL` after the winner commits.
        let sql = format!(
            "UPDATE quiz_attempts SET score = $2, total_questions = $3, completed_at = $4 \
             WHERE id = $1 AND completed_at IS NULL RETURNING {ATTEMPT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(attempt_id)
            .bind(completion.score)
            .bind(completion.total_questions)
            .bind(completion.completed_at)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(attempt) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        if !completion.answers.is_empty() {
            let mut query_builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO user_answers \
                 (attempt_id, question_id, choice_id, correct_choice_id, is_correct, answered_at) ",
            );
            query_builder.push_values(&completion.answers, |mut row, answer| {
                row.push_bind(attempt_id)
                    .push_bind(answer.question_id)
                    .push_bind(answer.choice_id)
                    .push_bind(answer.correct_choice_id)
                    .push_bind(answer.is_correct)
                    .push_bind(completion.completed_at);
            });
            query_builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(Some(attempt))
    }

    async fn list_answers(&self, attempt_id: i64) -> Result<Vec<UserAnswer>, RepositoryError> {
        let answers = sqlx::query_as::<_, UserAnswer>(
            r#"
            SELECT id, attempt_id, question_id, choice_id, correct_choice_id, is_correct, answered_at
            FROM user_answers
            WHERE attempt_id = $1
            ORDER BY id
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }
}

#[async_trait]
impl StatisticsRepository for PostgresStore {
    async fn save_statistics(&self, stats: &UserStatistics) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET total_attempts = $2, average_score = $3 WHERE id = $1",
        )
        .bind(stats.user_id)
        .bind(stats.total_attempts)
        .bind(stats.average_score)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Unavailable(format!(
                "no user row {} to store statistics on",
                stats.user_id
            )));
        }
        Ok(())
    }

    async fn fetch_statistics(
        &self,
        user_id: i64,
    ) -> Result<Option<UserStatistics>, RepositoryError> {
        let stats = sqlx::query_as::<_, UserStatistics>(
            r#"
            SELECT id AS user_id, total_attempts, average_score
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stats)
    }
}
