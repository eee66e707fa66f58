// src/services/mod.rs

pub mod attempt_service;
pub mod leaderboard_service;
pub mod scoring;
pub mod statistics_service;

use std::fmt;

use crate::repository::RepositoryError;

pub use attempt_service::AttemptService;
pub use leaderboard_service::LeaderboardService;
pub use statistics_service::StatisticsService;

/// Failures of the attempt engine.
///
/// Everything except `Storage` is a caller-facing outcome with a stable
/// message; `Storage` carries infrastructure detail that is only logged.
#[derive(Debug)]
pub enum AttemptError {
    QuizNotFound,
    QuizInactive,
    QuizEmpty,
    /// Unknown attempt, or an attempt owned by someone else.
    NotFound,
    NotOwner,
    AlreadyCompleted,
    IncompleteSubmission { expected: usize, received: usize },
    InvalidTopCount(i64),
    Storage(RepositoryError),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::QuizNotFound => write!(f, "Quiz not found"),
            AttemptError::QuizInactive => write!(f, "Quiz is not active"),
            AttemptError::QuizEmpty => write!(f, "Quiz has no questions"),
            AttemptError::NotFound => write!(f, "Attempt not found"),
            AttemptError::NotOwner => write!(f, "Attempt belongs to another user"),
            AttemptError::AlreadyCompleted => write!(f, "Attempt has already been completed"),
            AttemptError::IncompleteSubmission { expected, received } => write!(
                f,
                "All questions must be answered: expected {} answers, received {}",
                expected, received
            ),
            AttemptError::InvalidTopCount(top) => write!(
                f,
                "Leaderboard size must be between {} and {}, got {}",
                crate::config::LEADERBOARD_MIN_TOP,
                crate::config::LEADERBOARD_MAX_TOP,
                top
            ),
            AttemptError::Storage(e) => write!(f, "Storage failure: {}", e),
        }
    }
}

impl std::error::Error for AttemptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttemptError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RepositoryError> for AttemptError {
    fn from(err: RepositoryError) -> Self {
        AttemptError::Storage(err)
    }
}
