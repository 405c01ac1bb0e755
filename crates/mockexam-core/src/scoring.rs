//! Attempt scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Question;

/// Label reported in place of a user answer for skipped questions.
pub const NOT_ANSWERED: &str = "Not answered";

/// Outcome for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    /// The recorded answer. `None` for a skipped question.
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl QuestionResult {
    /// The recorded answer for display, or [`NOT_ANSWERED`].
    pub fn answer_label(&self) -> &str {
        self.user_answer.as_deref().unwrap_or(NOT_ANSWERED)
    }
}

/// Scored attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResults {
    /// Whole-number percentage, rounded half up.
    pub percentage: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
    /// Per-question outcomes in exam order.
    pub results: Vec<QuestionResult>,
}

impl ExamResults {
    pub fn incorrect_answers(&self) -> usize {
        self.total_questions - self.correct_answers
    }

    pub fn unanswered(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.user_answer.is_none())
            .count()
    }
}

/// Score answers against the bank. Correctness is exact string equality.
pub fn calculate_results(questions: &[Question], answers: &BTreeMap<usize, String>) -> ExamResults {
    let mut correct_answers = 0usize;

    let results = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let user_answer = answers.get(&index);
            let is_correct = user_answer.is_some_and(|a| *a == question.answer);
            if is_correct {
                correct_answers += 1;
            }
            QuestionResult {
                question: question.question.clone(),
                user_answer: user_answer.cloned(),
                correct_answer: question.answer.clone(),
                is_correct,
                reference: question.reference.clone(),
            }
        })
        .collect();

    ExamResults {
        percentage: percentage(correct_answers, questions.len()),
        correct_answers,
        total_questions: questions.len(),
        results,
    }
}

/// `round(correct / total * 100)`, ties rounded up. Zero for an empty bank.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // Operands are non-negative, so half-away-from-zero is half-up.
    (correct as f64 / total as f64 * 100.0).round() as u32
}
