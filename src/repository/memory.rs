// src/repository/memory.rs

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{AttemptRepository, ContentStore, RepositoryError, StatisticsRepository};
use crate::models::{
    attempt::{AttemptCompletion, QuizAttempt, UserAnswer},
    quiz::Quiz,
    user::UserStatistics,
};

#[derive(Default)]
struct Tables {
    quizzes: HashMap<i64, Quiz>,
    attempts: BTreeMap<i64, QuizAttempt>,
    answers: Vec<UserAnswer>,
    statistics: HashMap<i64, UserStatistics>,
    next_attempt_id: i64,
    next_answer_id: i64,
}

/// Process-local implementation of every storage trait.
///
/// A single mutex guards all tables, so the already-completed check and the
/// completion write happen under one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds (or replaces) a quiz tree, standing in for the authoring side.
    pub fn insert_quiz(&self, quiz: Quiz) -> Result<(), RepositoryError> {
        self.lock()?.quizzes.insert(quiz.id, quiz);
        Ok(())
    }

    /// Drops a quiz tree, as the authoring side would on deletion.
    pub fn remove_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, RepositoryError> {
        Ok(self.lock()?.quizzes.remove(&quiz_id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, RepositoryError> {
        Ok(self.lock()?.quizzes.get(&quiz_id).cloned())
    }
}

#[async_trait]
impl AttemptRepository for MemoryStore {
    async fn create_attempt(
        &self,
        quiz_id: i64,
        user_id: i64,
        started_at: DateTime<Utc>,
    ) -> Result<QuizAttempt, RepositoryError> {
        let mut tables = self.lock()?;
        tables.next_attempt_id += 1;
        let attempt = QuizAttempt {
            id: tables.next_attempt_id,
            quiz_id,
            user_id,
            started_at,
            completed_at: None,
            score: 0,
            total_questions: 0,
        };
        tables.attempts.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    async fn find_attempt(&self, attempt_id: i64) -> Result<Option<QuizAttempt>, RepositoryError> {
        Ok(self.lock()?.attempts.get(&attempt_id).cloned())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>, RepositoryError> {
        let mut list: Vec<QuizAttempt> = self
            .lock()?
            .attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn list_completed_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<QuizAttempt>, RepositoryError> {
        Ok(self
            .lock()?
            .attempts
            .values()
            .filter(|a| a.user_id == user_id && a.is_completed())
            .cloned()
            .collect())
    }

    async fn list_completed_by_quiz(
        &self,
        quiz_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<QuizAttempt>, RepositoryError> {
        let mut list: Vec<QuizAttempt> = self
            .lock()?
            .attempts
            .values()
            .filter(|a| a.quiz_id == quiz_id && a.is_completed())
            .cloned()
            .collect();
        list.sort_by(QuizAttempt::ranking_cmp);
        if let Some(limit) = limit {
            list.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(list)
    }

    async fn complete_attempt(
        &self,
        attempt_id: i64,
        completion: AttemptCompletion,
    ) -> Result<Option<QuizAttempt>, RepositoryError> {
        let mut tables = self.lock()?;

        let completed = match tables.attempts.get_mut(&attempt_id) {
            Some(attempt) if !attempt.is_completed() => {
                attempt.score = completion.score;
                attempt.total_questions = completion.total_questions;
                attempt.completed_at = Some(completion.completed_at);
                attempt.clone()
            }
            _ => return Ok(None),
        };

        for answer in completion.answers {
            tables.next_answer_id += 1;
            let id = tables.next_answer_id;
            tables.answers.push(UserAnswer {
                id,
                attempt_id,
                question_id: answer.question_id,
                choice_id: answer.choice_id,
                correct_choice_id: answer.correct_choice_id,
                is_correct: answer.is_correct,
                answered_at: completion.completed_at,
            });
        }

        Ok(Some(completed))
    }

    async fn list_answers(&self, attempt_id: i64) -> Result<Vec<UserAnswer>, RepositoryError> {
        Ok(self
            .lock()?
            .answers
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatisticsRepository for MemoryStore {
    async fn save_statistics(&self, stats: &UserStatistics) -> Result<(), RepositoryError> {
        self.lock()?.statistics.insert(stats.user_id, stats.clone());
        Ok(())
    }

    async fn fetch_statistics(
        &self,
        user_id: i64,
    ) -> Result<Option<UserStatistics>, RepositoryError> {
        Ok(self.lock()?.statistics.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attempt::NewUserAnswer;

    fn completion(score: i32) -> AttemptCompletion {
        AttemptCompletion {
            score,
            total_questions: 1,
            completed_at: Utc::now(),
            answers: vec![NewUserAnswer {
                question_id: 1,
                choice_id: 10,
                correct_choice_id: Some(10),
                is_correct: true,
            }],
        }
    }

    #[tokio::test]
    async fn test_complete_attempt_only_once() {
        let store = MemoryStore::new();
        let attempt = store.create_attempt(1, 7, Utc::now()).await.unwrap();

        let first = store.complete_attempt(attempt.id, completion(100)).await.unwrap();
        assert!(first.is_some());

        let second = store.complete_attempt(attempt.id, completion(0)).await.unwrap();
        assert!(second.is_none());

        let stored = store.find_attempt(attempt.id).await.unwrap().unwrap();
        assert_eq!(stored.score, 100);
        assert_eq!(store.list_answers(attempt.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_missing_attempt_writes_nothing() {
        let store = MemoryStore::new();
        let result = store.complete_attempt(42, completion(100)).await.unwrap();
        assert!(result.is_none());
        assert!(store.list_answers(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_user_newest_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let older = store
            .create_attempt(1, 7, now - chrono::Duration::minutes(10))
            .await
            .unwrap();
        let newer = store.create_attempt(2, 7, now).await.unwrap();
        store.create_attempt(1, 8, now).await.unwrap();

        let ids: Vec<i64> = store
            .list_by_user(7)
            .await
            .unwrap()
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
