//! Exam configuration and source factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mockexam_core::session::{ExamConfig, EXAM_DURATION_SECS, TOTAL_QUESTIONS};
use mockexam_core::shuffle::ShuffleMode;
use mockexam_core::traits::QuestionSource;

use crate::file::{FileSource, DEFAULT_QUESTIONS_PATH};
use crate::http::HttpSource;

/// Where the question bank is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    File {
        #[serde(default = "default_questions_path")]
        path: PathBuf,
    },
    Http {
        url: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::File {
            path: default_questions_path(),
        }
    }
}

impl SourceConfig {
    /// Interpret a bare location: `http(s)://` URLs are fetched, anything else
    /// is a file path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            SourceConfig::Http {
                url: location.to_string(),
            }
        } else {
            SourceConfig::File {
                path: PathBuf::from(location),
            }
        }
    }
}

/// Shuffle algorithm selector as written in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShuffleKind {
    #[default]
    Random,
    Seeded,
}

/// Top-level mockexam configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockexamConfig {
    /// Question bank location.
    #[serde(default)]
    pub source: SourceConfig,
    /// Exam length in seconds.
    #[serde(default = "default_duration")]
    pub duration_secs: u64,
    /// Questions kept after shuffling.
    #[serde(default = "default_total_questions")]
    pub total_questions: usize,
    #[serde(default)]
    pub shuffle: ShuffleKind,
    /// Fixed seed for `shuffle = "seeded"`.
    #[serde(default)]
    pub seed: Option<u32>,
    /// File holding the persisted exam clock.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Directory for reports written after submission.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

fn default_questions_path() -> PathBuf {
    PathBuf::from(DEFAULT_QUESTIONS_PATH)
}
fn default_duration() -> u64 {
    EXAM_DURATION_SECS
}
fn default_total_questions() -> usize {
    TOTAL_QUESTIONS
}
fn default_state_file() -> PathBuf {
    PathBuf::from(".mockexam").join("state.json")
}

impl Default for MockexamConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            duration_secs: default_duration(),
            total_questions: default_total_questions(),
            shuffle: ShuffleKind::default(),
            seed: None,
            state_file: default_state_file(),
            report_dir: None,
        }
    }
}

impl MockexamConfig {
    pub fn shuffle_mode(&self) -> ShuffleMode {
        match self.shuffle {
            ShuffleKind::Random => ShuffleMode::Random,
            ShuffleKind::Seeded => ShuffleMode::Seeded { seed: self.seed },
        }
    }

    /// Session settings derived from this configuration.
    pub fn exam_config(&self) -> ExamConfig {
        ExamConfig {
            duration_secs: self.duration_secs,
            total_questions: self.total_questions,
            shuffle: self.shuffle_mode(),
            ..ExamConfig::default()
        }
    }

    /// Apply `MOCKEXAM_QUESTIONS` and `MOCKEXAM_STATE_FILE` style overrides
    /// using `lookup` to read variables.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(location) = lookup("MOCKEXAM_QUESTIONS") {
            self.source = SourceConfig::from_location(&location);
        }
        if let Some(state_file) = lookup("MOCKEXAM_STATE_FILE") {
            self.state_file = PathBuf::from(state_file);
        }
    }

    fn resolve_env_vars(&mut self) {
        self.source = match &self.source {
            SourceConfig::File { path } => SourceConfig::File {
                path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
            },
            SourceConfig::Http { url } => SourceConfig::Http {
                url: resolve_env_vars(url),
            },
        };
        self.state_file = PathBuf::from(resolve_env_vars(&self.state_file.to_string_lossy()));
        self.report_dir = self
            .report_dir
            .as_ref()
            .map(|d| PathBuf::from(resolve_env_vars(&d.to_string_lossy())));
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `mockexam.toml` in the current directory
/// 2. `~/.config/mockexam/config.toml`
///
/// Environment variable overrides: `MOCKEXAM_QUESTIONS`, `MOCKEXAM_STATE_FILE`.
pub fn load_config_from(path: Option<&Path>) -> Result<MockexamConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("mockexam.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            toml::from_str::<MockexamConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MockexamConfig::default(),
    };

    config.apply_overrides(|name| std::env::var(name).ok());
    config.resolve_env_vars();
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mockexam"))
}

/// Create a question source from its configuration.
pub fn create_source(config: &SourceConfig) -> Result<Arc<dyn QuestionSource>> {
    match config {
        SourceConfig::File { path } => Ok(Arc::new(FileSource::new(path))),
        SourceConfig::Http { url } => {
            let source = HttpSource::new(url)
                .with_context(|| format!("failed to create HTTP source for {url}"))?;
            Ok(Arc::new(source))
        }
    }
}
