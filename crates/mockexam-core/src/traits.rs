//! Collaborator traits the exam session depends on.
//!
//! Question sources live in `mockexam-sources`, stores in `mockexam-store`,
//! and the terminal view in `mockexam-cli`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Question;
use crate::scoring::ExamResults;

// ---------------------------------------------------------------------------
// Question source trait
// ---------------------------------------------------------------------------

/// Where the question bank comes from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable source description (e.g. a path or URL).
    fn name(&self) -> &str;

    /// Fetch the complete, unshuffled bank.
    async fn fetch(&self) -> anyhow::Result<Vec<Question>>;
}

// ---------------------------------------------------------------------------
// Persistence trait
// ---------------------------------------------------------------------------

/// A string key-value store. The session keeps exactly one key in it.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// View trait
// ---------------------------------------------------------------------------

/// Named screens of the exam UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Start,
    Exam,
    Results,
}

/// Answered/flagged state of one question in the progress indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressItem {
    pub answered: bool,
    pub flagged: bool,
}

/// Snapshot of the progress indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Index of the question on screen.
    pub current: usize,
    pub items: Vec<ProgressItem>,
}

impl Progress {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn answered(&self) -> usize {
        self.items.iter().filter(|i| i.answered).count()
    }

    pub fn flagged(&self) -> usize {
        self.items.iter().filter(|i| i.flagged).count()
    }
}

/// A flagged question listed when a submission is held back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedQuestion {
    pub index: usize,
    pub text: String,
}

/// The presentation layer driven by the session.
///
/// Rendering methods are fire-and-forget. `confirm` is a request/response
/// exchange: the session suspends until the user answers.
#[async_trait]
pub trait ExamView: Send + Sync {
    fn show_screen(&self, screen: Screen);

    fn show_error(&self, message: &str);

    /// Build the progress indicator for a new attempt.
    fn create_progress(&self, total: usize);

    fn update_progress(&self, progress: &Progress);

    /// `number` is 1-based.
    fn render_question(
        &self,
        question: &Question,
        selected: Option<&str>,
        number: usize,
        total: usize,
    );

    fn update_flag_button(&self, flagged: bool);

    fn update_navigation(&self, prev_enabled: bool, next_enabled: bool);

    fn update_timer(&self, seconds_left: u64);

    fn show_flagged(&self, flagged: &[FlaggedQuestion]);

    fn render_results(&self, results: &ExamResults);

    /// Ask the user to confirm `message`. `false` aborts the pending action.
    async fn confirm(&self, message: &str) -> bool;
}
