// src/repository/mod.rs

//! Storage seams of the attempt engine.
//!
//! The engine talks to three collaborators: the read-only content store that
//! owns quiz trees, the attempt repository, and the user statistics record.
//! `postgres` backs them with sqlx, `memory` keeps everything in process.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    attempt::{AttemptCompletion, QuizAttempt, UserAnswer},
    quiz::Quiz,
    user::UserStatistics,
};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Infrastructure failure raised by a storage adapter.
#[derive(Debug)]
pub enum RepositoryError {
    Database(sqlx::Error),
    Unavailable(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Database(e) => write!(f, "database error: {}", e),
            RepositoryError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::Database(e) => Some(e),
            RepositoryError::Unavailable(_) => None,
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err)
    }
}

/// Read-only source of quiz → question → choice trees.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, RepositoryError>;
}

/// Persistence of attempts and their answer rows.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Inserts a fresh in-progress attempt with a zero score.
    async fn create_attempt(
        &self,
        quiz_id: i64,
        user_id: i64,
        started_at: DateTime<Utc>,
    ) -> Result<QuizAttempt, RepositoryError>;

    async fn find_attempt(&self, attempt_id: i64) -> Result<Option<QuizAttempt>, RepositoryError>;

    /// All attempts of a user, newest start first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, RepositoryError>;

    async fn list_completed_by_user(&self, user_id: i64)
    -> Result<Vec<QuizAttempt>, RepositoryError>;

    /// Completed attempts of a quiz in ranking order: score descending,
    /// duration ascending, id ascending. `limit = None` returns all of them.
    async fn list_completed_by_quiz(
        &self,
        quiz_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<QuizAttempt>, RepositoryError>;

    /// Atomically marks the attempt completed and stores its answers.
    ///
    /// Returns `None` when the attempt does not exist or was already
    /// completed; in that case nothing is written. Readers never observe the
    /// completion without the full answer set.
    async fn complete_attempt(
        &self,
        attempt_id: i64,
        completion: AttemptCompletion,
    ) -> Result<Option<QuizAttempt>, RepositoryError>;

    async fn list_answers(&self, attempt_id: i64) -> Result<Vec<UserAnswer>, RepositoryError>;
}

/// Statistics fields of the user record.
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    async fn save_statistics(&self, stats: &UserStatistics) -> Result<(), RepositoryError>;

    async fn fetch_statistics(
        &self,
        user_id: i64,
    ) -> Result<Option<UserStatistics>, RepositoryError>;
}
