// src/services/statistics_service.rs

use std::sync::Arc;

use crate::{
    models::{attempt::QuizAttempt, user::UserStatistics},
    repository::{AttemptRepository, StatisticsRepository},
    services::AttemptError,
};

/// Keeps the per-user attempt count and average score in sync.
#[derive(Clone)]
pub struct StatisticsService {
    attempts: Arc<dyn AttemptRepository>,
    store: Arc<dyn StatisticsRepository>,
}

/// Folds completed attempts into statistics. Mean of scores, 0 when empty.
pub fn aggregate(user_id: i64, completed: &[QuizAttempt]) -> UserStatistics {
    if completed.is_empty() {
        return UserStatistics::empty(user_id);
    }
    let total: i64 = completed.iter().map(|a| i64::from(a.score)).sum();
    UserStatistics {
        user_id,
        total_attempts: completed.len() as i64,
        average_score: total as f64 / completed.len() as f64,
    }
}

impl StatisticsService {
    pub fn new(attempts: Arc<dyn AttemptRepository>, store: Arc<dyn StatisticsRepository>) -> Self {
        Self { attempts, store }
    }

    /// Recomputes from every completed attempt of the user and persists.
    pub async fn recompute(&self, user_id: i64) -> Result<UserStatistics, AttemptError> {
        let completed = self.attempts.list_completed_by_user(user_id).await?;
        let stats = aggregate(user_id, &completed);
        self.store.save_statistics(&stats).await?;

        tracing::debug!(
            "Statistics for user {}: {} attempts, average {:.2}",
            user_id,
            stats.total_attempts,
            stats.average_score
        );
        Ok(stats)
    }

    pub async fn get(&self, user_id: i64) -> Result<UserStatistics, AttemptError> {
        Ok(self
            .store
            .fetch_statistics(user_id)
            .await?
            .unwrap_or_else(|| UserStatistics::empty(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        models::attempt::AttemptCompletion,
        repository::MemoryStore,
    };

    fn completed(id: i64, score: i32) -> QuizAttempt {
        let now = Utc::now();
        QuizAttempt {
            id,
            quiz_id: 1,
            user_id: 3,
            started_at: now,
            completed_at: Some(now),
            score,
            total_questions: 4,
        }
    }

    #[test]
    fn test_aggregate_mean() {
        let stats = aggregate(3, &[completed(1, 50), completed(2, 100), completed(3, 75)]);
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.average_score, 75.0);
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(3, &[]), UserStatistics::empty(3));
    }

    #[tokio::test]
    async fn test_recompute_ignores_in_progress_attempts() {
        let store = Arc::new(MemoryStore::new());
        let service = StatisticsService::new(store.clone(), store.clone());

        let done = store.create_attempt(1, 3, Utc::now()).await.unwrap();
        store
            .complete_attempt(
                done.id,
                AttemptCompletion {
                    score: 80,
                    total_questions: 5,
                    completed_at: Utc::now(),
                    answers: vec![],
                },
            )
            .await
            .unwrap();
        store.create_attempt(1, 3, Utc::now()).await.unwrap();

        let stats = service.recompute(3).await.unwrap();
        assert_eq!(stats.total_attempts, 1);
        assert_eq!(stats.average_score, 80.0);
        assert_eq!(service.get(3).await.unwrap(), stats);
    }

    #[tokio::test]
    async fn test_get_without_record_is_zero() {
        let store = Arc::new(MemoryStore::new());
        let service = StatisticsService::new(store.clone(), store);
        assert_eq!(service.get(9).await.unwrap(), UserStatistics::empty(9));
    }
}
