//! Question bank loaded from a local JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use mockexam_core::parser::parse_bank_str;
use mockexam_core::traits::QuestionSource;
use mockexam_core::Question;

use crate::error::SourceError;

/// Relative path used when no source is configured.
pub const DEFAULT_QUESTIONS_PATH: &str = "questions.json";

/// Reads the bank from a JSON file on every fetch.
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTIONS_PATH)
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(path = %self.name))]
    async fn fetch(&self) -> anyhow::Result<Vec<Question>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Io {
                path: self.name.clone(),
                message: e.to_string(),
            })?;

        let questions =
            parse_bank_str(&content, &self.name).map_err(|e| SourceError::Parse {
                origin: self.name.clone(),
                message: format!("{e:#}"),
            })?;

        tracing::debug!(count = questions.len(), "read question bank");
        Ok(questions)
    }
}
