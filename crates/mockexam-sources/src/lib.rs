//! mockexam-sources: Question bank sources and configuration.
//!
//! Implements the `QuestionSource` trait for local JSON files and HTTP
//! endpoints, and loads the `mockexam.toml` configuration.

pub mod config;
pub mod error;
pub mod file;
pub mod http;

pub use config::{create_source, load_config_from, MockexamConfig, ShuffleKind, SourceConfig};
pub use error::SourceError;
pub use file::FileSource;
pub use http::HttpSource;
