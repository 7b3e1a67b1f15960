use serde::{Deserialize, Serialize};

use crate::session::FlatQuestion;

/// Final result of a quiz: correct count, question count and a percentage
/// rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizScore {
    correct: usize,
    total: usize,
    percent: f64,
}

impl QuizScore {
    /// Scores `answers` against `questions` position by position.
    ///
    /// Unanswered positions and questions with an out-of-range correct index
    /// count as incorrect. An empty question list scores 0.
    #[must_use]
    pub fn compute(questions: &[FlatQuestion], answers: &[Option<usize>]) -> Self {
        let correct = questions
            .iter()
            .zip(answers)
            .filter(|(flat, answer)| answer.is_some_and(|a| flat.question.is_correct(a)))
            .count();
        Self::from_counts(correct, questions.len())
    }

    #[must_use]
    pub fn from_counts(correct: usize, total: usize) -> Self {
        Self {
            correct,
            total,
            percent: percentage(correct, total),
        }
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Percentage in `0.0..=100.0`, one decimal place.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.percent
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = correct as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
