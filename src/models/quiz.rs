// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A quiz as read from the content store, with its full question tree.
///
/// Quizzes are authored elsewhere; the attempt engine only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub is_active: bool,
    pub owner_id: i64,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub explanation: Option<String>,
    pub image_url: Option<String>,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
}

impl Quiz {
    pub fn question(&self, question_id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

impl Question {
    pub fn choice(&self, choice_id: i64) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    /// The single correct choice. Authoring guarantees exactly one exists.
    pub fn correct_choice(&self) -> Option<&Choice> {
        self.choices.iter().find(|c| c.is_correct)
    }
}

/// Row of the 'quizzes' table.
#[derive(Debug, FromRow)]
pub struct QuizRow {
    pub id: i64,
    pub title: String,
    pub is_active: bool,
    pub owner_id: i64,
}

/// Row of the 'questions' table.
#[derive(Debug, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub text: String,
    pub explanation: Option<String>,
    pub image_url: Option<String>,
}

/// Row of the 'choices' table, carrying its parent question id.
#[derive(Debug, FromRow)]
pub struct ChoiceRow {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}
