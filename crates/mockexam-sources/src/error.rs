//! Question source error types.

use thiserror::Error;

/// Errors that can occur while fetching a question bank.
///
/// The session treats every variant the same way: as a load failure.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The server answered with a non-success status.
    #[error("HTTP error! status: {status} ({url})")]
    Http { status: u16, url: String },

    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The bank could not be read from disk.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// The payload was not a JSON array of questions.
    #[error("invalid question bank from {origin}: {message}")]
    Parse { origin: String, message: String },
}
