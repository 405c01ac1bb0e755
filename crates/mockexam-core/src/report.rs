//! Exam report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{ExamResults, QuestionResult};

/// A complete report of one submitted attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the attempt was submitted.
    pub created_at: DateTime<Utc>,
    /// Name of the question source.
    pub source: String,
    pub question_count: usize,
    pub correct_answers: usize,
    pub percentage: u32,
    /// Seconds between start and submission, capped at the exam duration.
    pub time_used_secs: u64,
    pub duration_secs: u64,
    /// Whether the countdown ran out rather than the user submitting.
    pub auto_submitted: bool,
    /// Per-question outcomes.
    pub results: Vec<QuestionResult>,
}

impl ExamReport {
    pub fn new(
        source: &str,
        results: &ExamResults,
        time_used_secs: u64,
        duration_secs: u64,
        auto_submitted: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: source.to_string(),
            question_count: results.total_questions,
            correct_answers: results.correct_answers,
            percentage: results.percentage,
            time_used_secs,
            duration_secs,
            auto_submitted,
            results: results.results.clone(),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Questions answered incorrectly or skipped, in exam order.
    pub fn missed(&self) -> impl Iterator<Item = &QuestionResult> {
        self.results.iter().filter(|r| !r.is_correct)
    }
}
