// src/services/attempt_service.rs

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;

use crate::{
    models::{
        attempt::{
            AnswerSubmission, AttemptCompletion, AttemptResult, AttemptSummary, QuestionResult,
            QuizAttempt, UserAnswer,
        },
        quiz::Quiz,
    },
    repository::{AttemptRepository, ContentStore},
    services::{
        AttemptError,
        scoring::{calculate_score, score_answers},
        statistics_service::StatisticsService,
    },
};

/// Drives an attempt through NotStarted → InProgress → Completed.
#[derive(Clone)]
pub struct AttemptService {
    content: Arc<dyn ContentStore>,
    attempts: Arc<dyn AttemptRepository>,
    statistics: StatisticsService,
}

impl AttemptService {
    pub fn new(
        content: Arc<dyn ContentStore>,
        attempts: Arc<dyn AttemptRepository>,
        statistics: StatisticsService,
    ) -> Self {
        Self {
            content,
            attempts,
            statistics,
        }
    }

    /// Starts a new attempt. Users may hold several open attempts on one quiz.
    pub async fn start_attempt(
        &self,
        quiz_id: i64,
        user_id: i64,
    ) -> Result<AttemptSummary, AttemptError> {
        let quiz = self
            .content
            .fetch_quiz(quiz_id)
            .await?
            .ok_or(AttemptError::QuizNotFound)?;

        if !quiz.is_active {
            return Err(AttemptError::QuizInactive);
        }
        if quiz.questions.is_empty() {
            return Err(AttemptError::QuizEmpty);
        }

        let attempt = self
            .attempts
            .create_attempt(quiz_id, user_id, Utc::now())
            .await?;

        tracing::info!(
            "User {} started attempt {} on quiz {}",
            user_id,
            attempt.id,
            quiz_id
        );
        Ok(AttemptSummary::from(&attempt))
    }

    /// Scores and completes an attempt.
    ///
    /// Every question must be answered. Answers pointing at questions or
    /// choices outside the quiz are logged and dropped.
    pub async fn submit_attempt(
        &self,
        attempt_id: i64,
        user_id: i64,
        answers: &[AnswerSubmission],
    ) -> Result<AttemptResult, AttemptError> {
        let attempt = self
            .attempts
            .find_attempt(attempt_id)
            .await?
            .ok_or(AttemptError::NotFound)?;

        if attempt.user_id != user_id {
            return Err(AttemptError::NotOwner);
        }
        if attempt.is_completed() {
            return Err(AttemptError::AlreadyCompleted);
        }

        let Some(quiz) = self.content.fetch_quiz(attempt.quiz_id).await? else {
            tracing::warn!(
                "Attempt {}: quiz {} no longer exists, rejecting submission",
                attempt_id,
                attempt.quiz_id
            );
            return Err(AttemptError::NotFound);
        };

        if answers.len() != quiz.questions.len() {
            return Err(AttemptError::IncompleteSubmission {
                expected: quiz.questions.len(),
                received: answers.len(),
            });
        }

        let selected = collect_answers(&quiz, attempt_id, answers);
        let card = score_answers(&quiz, &selected);
        let completed_at = Utc::now();

        let completion = AttemptCompletion {
            score: card.score,
            total_questions: card.total_questions as i32,
            completed_at,
            answers: card.answers,
        };

        let Some(completed) = self.attempts.complete_attempt(attempt_id, completion).await? else {
            tracing::warn!(
                "Attempt {} was completed concurrently, rejecting duplicate submission",
                attempt_id
            );
            return Err(AttemptError::AlreadyCompleted);
        };

        tracing::info!(
            "User {} completed attempt {} on quiz {}: score {} ({}/{})",
            user_id,
            attempt_id,
            quiz.id,
            card.score,
            card.correct_count,
            card.total_questions
        );

        // The submission already stands; a failed recompute is repaired by the next one.
        if let Err(e) = self.statistics.recompute(user_id).await {
            tracing::error!("Failed to recompute statistics for user {}: {}", user_id, e);
        }

        Ok(AttemptResult {
            attempt_id: completed.id,
            quiz_id: completed.quiz_id,
            quiz_title: Some(quiz.title),
            score: completed.score,
            percentage: card.percentage,
            correct_answers: card.correct_count as i32,
            total_questions: completed.total_questions,
            started_at: completed.started_at,
            completed_at,
            duration_seconds: (completed_at - completed.started_at).num_seconds(),
            questions: card.results,
        })
    }

    /// Fetches an attempt the user owns. Foreign attempts look missing.
    async fn owned_attempt(
        &self,
        attempt_id: i64,
        user_id: i64,
    ) -> Result<QuizAttempt, AttemptError> {
        match self.attempts.find_attempt(attempt_id).await? {
            Some(attempt) if attempt.user_id == user_id => Ok(attempt),
            _ => Err(AttemptError::NotFound),
        }
    }

    pub async fn get_attempt(
        &self,
        attempt_id: i64,
        user_id: i64,
    ) -> Result<AttemptSummary, AttemptError> {
        let attempt = self.owned_attempt(attempt_id, user_id).await?;
        Ok(AttemptSummary::from(&attempt))
    }

    /// Rebuilds the result of a completed attempt from its stored answers.
    ///
    /// Correctness comes from the stored rows; current quiz content is only
    /// used for display text.
    pub async fn get_result(
        &self,
        attempt_id: i64,
        user_id: i64,
    ) -> Result<AttemptResult, AttemptError> {
        let attempt = self.owned_attempt(attempt_id, user_id).await?;
        let Some(completed_at) = attempt.completed_at else {
            return Err(AttemptError::NotFound);
        };

        let answers = self.attempts.list_answers(attempt_id).await?;
        let quiz = self.content.fetch_quiz(attempt.quiz_id).await?;

        let questions = replay_breakdown(quiz.as_ref(), &answers);

        let correct_answers = answers.iter().filter(|a| a.is_correct).count();
        let (_, percentage) =
            calculate_score(correct_answers, attempt.total_questions.max(0) as usize);

        Ok(AttemptResult {
            attempt_id: attempt.id,
            quiz_id: attempt.quiz_id,
            quiz_title: quiz.map(|q| q.title),
            score: attempt.score,
            percentage,
            correct_answers: correct_answers as i32,
            total_questions: attempt.total_questions,
            started_at: attempt.started_at,
            completed_at,
            duration_seconds: (completed_at - attempt.started_at).num_seconds(),
            questions,
        })
    }

    /// All attempts of the user, newest first.
    pub async fn list_user_attempts(
        &self,
        user_id: i64,
    ) -> Result<Vec<AttemptSummary>, AttemptError> {
        let attempts = self.attempts.list_by_user(user_id).await?;
        Ok(attempts.iter().map(AttemptSummary::from).collect())
    }

    /// Every completed attempt of the quiz in leaderboard order.
    pub async fn list_quiz_attempts(
        &self,
        quiz_id: i64,
    ) -> Result<Vec<AttemptSummary>, AttemptError> {
        let mut attempts = self.attempts.list_completed_by_quiz(quiz_id, None).await?;
        attempts.sort_by(QuizAttempt::ranking_cmp);
        Ok(attempts.iter().map(AttemptSummary::from).collect())
    }
}

/// Maps submitted answers to question id → choice id, keeping only answers
/// that reference this quiz. The first answer per question wins.
fn collect_answers(quiz: &Quiz, attempt_id: i64, answers: &[AnswerSubmission]) -> HashMap<i64, i64> {
    let mut selected = HashMap::with_capacity(answers.len());

    for answer in answers {
        let Some(question) = quiz.question(answer.question_id) else {
            tracing::warn!(
                "Attempt {}: question {} is not part of quiz {}, skipping answer",
                attempt_id,
                answer.question_id,
                quiz.id
            );
            continue;
        };

        if question.choice(answer.choice_id).is_none() {
            tracing::warn!(
                "Attempt {}: choice {} does not belong to question {}, skipping answer",
                attempt_id,
                answer.choice_id,
                question.id
            );
            continue;
        }

        if selected.contains_key(&question.id) {
            tracing::warn!(
                "Attempt {}: duplicate answer for question {}, keeping the first",
                attempt_id,
                question.id
            );
            continue;
        }

        selected.insert(question.id, answer.choice_id);
    }

    selected
}

/// Per-question breakdown from stored rows, in quiz order.
///
/// Quiz questions without a row are listed as unanswered. Rows for questions
/// no longer in the quiz follow at the end.
fn replay_breakdown(quiz: Option<&Quiz>, answers: &[UserAnswer]) -> Vec<QuestionResult> {
    let by_question: HashMap<i64, &UserAnswer> =
        answers.iter().map(|a| (a.question_id, a)).collect();

    let Some(quiz) = quiz else {
        return answers.iter().map(|a| replay_answer(None, a)).collect();
    };

    let mut results: Vec<QuestionResult> = quiz
        .questions
        .iter()
        .map(|question| match by_question.get(&question.id) {
            Some(answer) => replay_answer(Some(quiz), answer),
            None => {
                let correct = question.correct_choice();
                QuestionResult {
                    question_id: question.id,
                    question_text: Some(question.text.clone()),
                    explanation: question.explanation.clone(),
                    image_url: question.image_url.clone(),
                    selected_choice_id: None,
                    selected_choice_text: None,
                    correct_choice_id: correct.map(|c| c.id),
                    correct_choice_text: correct.map(|c| c.text.clone()),
                    is_correct: false,
                }
            }
        })
        .collect();

    results.extend(
        answers
            .iter()
            .filter(|a| quiz.question(a.question_id).is_none())
            .map(|a| replay_answer(Some(quiz), a)),
    );
    results
}

fn replay_answer(quiz: Option<&Quiz>, answer: &UserAnswer) -> QuestionResult {
    let question = quiz.and_then(|q| q.question(answer.question_id));
    let choice_text = |choice_id: i64| {
        question
            .and_then(|q| q.choice(choice_id))
            .map(|c| c.text.clone())
    };

    QuestionResult {
        question_id: answer.question_id,
        question_text: question.map(|q| q.text.clone()),
        explanation: question.and_then(|q| q.explanation.clone()),
        image_url: question.and_then(|q| q.image_url.clone()),
        selected_choice_id: Some(answer.choice_id),
        selected_choice_text: choice_text(answer.choice_id),
        correct_choice_id: answer.correct_choice_id,
        correct_choice_text: answer.correct_choice_id.and_then(choice_text),
        is_correct: answer.is_correct,
    }
}
