// src/services/leaderboard_service.rs

use std::sync::Arc;

use crate::{
    config::{LEADERBOARD_MAX_TOP, LEADERBOARD_MIN_TOP},
    models::attempt::{AttemptSummary, LeaderboardEntry, QuizAttempt},
    repository::AttemptRepository,
    services::AttemptError,
};

/// Ranks completed attempts of a quiz.
#[derive(Clone)]
pub struct LeaderboardService {
    attempts: Arc<dyn AttemptRepository>,
}

/// Orders completed attempts and assigns 1-based ranks.
/// Users with several attempts appear once per attempt.
pub fn rank(mut attempts: Vec<QuizAttempt>) -> Vec<LeaderboardEntry> {
    attempts.retain(QuizAttempt::is_completed);
    attempts.sort_by(QuizAttempt::ranking_cmp);
    attempts
        .iter()
        .enumerate()
        .map(|(i, attempt)| LeaderboardEntry {
            rank: i + 1,
            attempt: AttemptSummary::from(attempt),
        })
        .collect()
}

impl LeaderboardService {
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    /// Top `top` completed attempts of the quiz. `top` must lie in [1, 100].
    pub async fn get_leaderboard(
        &self,
        quiz_id: i64,
        top: i64,
    ) -> Result<Vec<LeaderboardEntry>, AttemptError> {
        if !(LEADERBOARD_MIN_TOP..=LEADERBOARD_MAX_TOP).contains(&top) {
            return Err(AttemptError::InvalidTopCount(top));
        }

        let attempts = self
            .attempts
            .list_completed_by_quiz(quiz_id, Some(top))
            .await?;

        let mut entries = rank(attempts);
        entries.truncate(top as usize);
        Ok(entries)
    }
}
