//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing persisted session state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file exists but is not a JSON object of strings.
    #[error("corrupt state file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// A previous holder of the store lock panicked.
    #[error("store lock poisoned")]
    Poisoned,
}
