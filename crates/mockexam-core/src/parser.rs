//! JSON question bank parser.
//!
//! Loads question banks from JSON files and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Question;

/// Parse a question bank file.
pub fn parse_bank(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, &path.display().to_string())
}

/// Parse a JSON string into a question bank. `origin` names the source in errors.
pub fn parse_bank_str(content: &str, origin: &str) -> Result<Vec<Question>> {
    let questions: Vec<Question> = serde_json::from_str(content)
        .with_context(|| format!("failed to parse question bank JSON: {origin}"))?;
    Ok(questions)
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Position of the question in the bank (0-based), if applicable.
    pub index: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common authoring mistakes.
pub fn validate_bank(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if questions.is_empty() {
        warnings.push(ValidationWarning {
            index: None,
            message: "question bank is empty".into(),
        });
    }

    let mut seen = HashSet::new();
    for (index, q) in questions.iter().enumerate() {
        if q.question.trim().is_empty() {
            warnings.push(ValidationWarning {
                index: Some(index),
                message: "question text is empty".into(),
            });
        } else if !seen.insert(q.question.trim()) {
            warnings.push(ValidationWarning {
                index: Some(index),
                message: format!("duplicate question: {}", q.question.trim()),
            });
        }

        if q.options.is_empty() {
            warnings.push(ValidationWarning {
                index: Some(index),
                message: "question has no options".into(),
            });
        } else if !q.options.contains_id(&q.answer) {
            // Such a question can never be answered correctly.
            warnings.push(ValidationWarning {
                index: Some(index),
                message: format!("answer '{}' is not one of the options", q.answer),
            });
        }
    }

    warnings
}
