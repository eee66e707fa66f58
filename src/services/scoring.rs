// src/services/scoring.rs

//! Pure scoring of a submission against a quiz tree. No I/O.

use std::collections::HashMap;

use crate::models::{
    attempt::{NewUserAnswer, QuestionResult},
    quiz::Quiz,
};

/// Outcome of scoring one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    /// One entry per quiz question, in quiz order.
    pub results: Vec<QuestionResult>,
    /// Rows to persist: one per answered question.
    pub answers: Vec<NewUserAnswer>,
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: i32,
    pub percentage: f64,
}

/// Returns `(score, percentage)` where score is the percentage rounded half-up.
pub fn calculate_score(correct_count: usize, total_questions: usize) -> (i32, f64) {
    if total_questions == 0 {
        return (0, 0.0);
    }
    let percentage = (correct_count as f64 / total_questions as f64) * 100.0;
    // The ratio is never negative, so rounding half away from zero is half-up
    (percentage.round() as i32, percentage)
}

/// Scores `answers` (question id → chosen choice id) against `quiz`.
///
/// Questions without an entry are unanswered and count as wrong. A choice id
/// that does not belong to its question is treated the same way.
pub fn score_answers(quiz: &Quiz, answers: &HashMap<i64, i64>) -> ScoreCard {
    let mut results = Vec::with_capacity(quiz.questions.len());
    let mut rows = Vec::with_capacity(answers.len());
    let mut correct_count = 0;

    for question in &quiz.questions {
        let correct = question.correct_choice();
        let selected = answers
            .get(&question.id)
            .and_then(|choice_id| question.choice(*choice_id));
        let is_correct = selected.is_some_and(|c| c.is_correct);

        if is_correct {
            correct_count += 1;
        }

        if let Some(choice) = selected {
            rows.push(NewUserAnswer {
                question_id: question.id,
                choice_id: choice.id,
                correct_choice_id: correct.map(|c| c.id),
                is_correct,
            });
        }

        results.push(QuestionResult {
            question_id: question.id,
            question_text: Some(question.text.clone()),
            explanation: question.explanation.clone(),
            image_url: question.image_url.clone(),
            selected_choice_id: selected.map(|c| c.id),
            selected_choice_text: selected.map(|c| c.text.clone()),
            correct_choice_id: correct.map(|c| c.id),
            correct_choice_text: correct.map(|c| c.text.clone()),
            is_correct,
        });
    }

    let total_questions = quiz.questions.len();
    let (score, percentage) = calculate_score(correct_count, total_questions);

    ScoreCard {
        results,
        answers: rows,
        correct_count,
        total_questions,
        score,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{Choice, Question};

    /// Question `id` with choices `id*10` (correct) and `id*10 + 1` (wrong).
    fn question(id: i64) -> Question {
        Question {
            id,
            text: format!("Question {}", id),
            explanation: None,
            image_url: None,
            choices: vec![
                Choice {
                    id: id * 10,
                    text: "Right".to_string(),
                    is_correct: true,
                },
                Choice {
                    id: id * 10 + 1,
                    text: "Wrong".to_string(),
                    is_correct: false,
                },
            ],
        }
    }

    fn quiz(question_count: i64) -> Quiz {
        Quiz {
            id: 1,
            title: "Quiz".to_string(),
            is_active: true,
            owner_id: 1,
            questions: (1..=question_count).map(question).collect(),
        }
    }

    #[test]
    fn test_score_all_correct() {
        let answers = HashMap::from([(1, 10), (2, 20)]);
        let card = score_answers(&quiz(2), &answers);
        assert_eq!(card.correct_count, 2);
        assert_eq!(card.score, 100);
        assert_eq!(card.answers.len(), 2);
    }

    #[test]
    fn test_score_half() {
        let answers = HashMap::from([(1, 10), (2, 21)]);
        let card = score_answers(&quiz(2), &answers);
        assert_eq!(card.correct_count, 1);
        assert_eq!(card.score, 50);
        assert_eq!(card.percentage, 50.0);
        assert!(!card.results[1].is_correct);
        assert_eq!(card.results[1].correct_choice_id, Some(20));
    }

    #[test]
    fn test_score_unanswered_and_foreign_choice_are_wrong() {
        // Question 2 is missing, question 3 points at a choice of question 1
        let answers = HashMap::from([(1, 10), (3, 10)]);
        let card = score_answers(&quiz(3), &answers);
        assert_eq!(card.correct_count, 1);
        assert_eq!(card.answers.len(), 1);
        assert_eq!(card.results[1].selected_choice_id, None);
        assert_eq!(card.results[2].selected_choice_id, None);
        assert_eq!(card.score, 33);
    }

    #[test]
    fn test_single_question_is_all_or_nothing() {
        let right = score_answers(&quiz(1), &HashMap::from([(1, 10)]));
        let wrong = score_answers(&quiz(1), &HashMap::from([(1, 11)]));
        assert_eq!(right.score, 100);
        assert_eq!(wrong.score, 0);
    }

    #[test]
    fn test_calculate_score_rounds_half_up() {
        // 1/8 = 12.5%, 2/3 = 66.67%, 1/3 = 33.33%
        assert_eq!(calculate_score(1, 8).0, 13);
        assert_eq!(calculate_score(2, 3).0, 67);
        assert_eq!(calculate_score(1, 3).0, 33);
        assert_eq!(calculate_score(0, 0), (0, 0.0));
    }
}
