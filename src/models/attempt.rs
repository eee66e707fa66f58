// src/models/attempt.rs

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quiz_attempts' table in the database.
///
/// `completed_at` is null while the attempt is in progress and is written
/// exactly once, together with `score`, `total_questions` and the answer rows.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: i32,
    pub total_questions: i32,
}

impl QuizAttempt {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Time between start and completion. `None` while in progress.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|done| done - self.started_at)
    }

    /// Leaderboard order: higher score first, then shorter duration, then
    /// lower id so equal entries always come out the same way.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| {
                let mine = self.duration().unwrap_or(chrono::Duration::MAX);
                let theirs = other.duration().unwrap_or(chrono::Duration::MAX);
                mine.cmp(&theirs)
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Represents the 'user_answers' table.
/// Immutable once written; at most one row per (attempt, question).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub choice_id: i64,
    /// Snapshot of the correct choice when the answer was scored.
    pub correct_choice_id: Option<i64>,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// An answer row waiting to be persisted with the attempt's completion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserAnswer {
    pub question_id: i64,
    pub choice_id: i64,
    pub correct_choice_id: Option<i64>,
    pub is_correct: bool,
}

/// Everything written by the single completion step of a submission.
#[derive(Debug, Clone)]
pub struct AttemptCompletion {
    pub score: i32,
    pub total_questions: i32,
    pub completed_at: DateTime<Utc>,
    pub answers: Vec<NewUserAnswer>,
}

/// Public view of an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: i32,
    pub completed: bool,
    pub duration_seconds: Option<i64>,
}

impl From<&QuizAttempt> for AttemptSummary {
    fn from(attempt: &QuizAttempt) -> Self {
        Self {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            user_id: attempt.user_id,
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
            score: attempt.score,
            completed: attempt.is_completed(),
            duration_seconds: attempt.duration().map(|d| d.num_seconds()),
        }
    }
}

/// Per-question outcome of a scored attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub question_text: Option<String>,
    pub explanation: Option<String>,
    pub image_url: Option<String>,
    pub selected_choice_id: Option<i64>,
    pub selected_choice_text: Option<String>,
    pub correct_choice_id: Option<i64>,
    pub correct_choice_text: Option<String>,
    pub is_correct: bool,
}

/// Full result of a completed attempt, returned by submit and by result lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub quiz_title: Option<String>,
    pub score: i32,
    pub percentage: f64,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub questions: Vec<QuestionResult>,
}

/// Ranked row of a quiz leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub attempt: AttemptSummary,
}

/// DTO for starting an attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(range(min = 1))]
    pub quiz_id: i64,
}

/// One selected choice in a submission.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AnswerSubmission {
    #[validate(range(min = 1))]
    pub question_id: i64,
    #[validate(range(min = 1))]
    pub choice_id: i64,
}

/// DTO for submitting an attempt. Every question of the quiz must be answered.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(nested)]
    pub answers: Vec<AnswerSubmission>,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub top: Option<i64>,
}
