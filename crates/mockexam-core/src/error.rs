//! Exam session error types.
//!
//! None of them is fatal: the session reports each to the view as a
//! user-visible message and stays in a well-defined phase.

use thiserror::Error;

/// Errors that can occur while preparing or starting an exam attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExamError {
    /// The question source was unreachable or returned malformed data.
    #[error("failed to load exam questions: {0}")]
    LoadFailure(String),

    /// An attempt was started before any questions were loaded.
    #[error("no questions loaded, cannot start the exam")]
    EmptyBankAttempt,

    /// An attempt was started from somewhere other than the start screen.
    #[error("an attempt can only be started from the start screen")]
    NotAtStartScreen,
}

impl ExamError {
    /// The message shown to the user for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExamError::LoadFailure(_) => {
                "Failed to load exam questions. Check the question source and try again."
            }
            ExamError::EmptyBankAttempt => "No questions loaded. Cannot start the exam.",
            ExamError::NotAtStartScreen => {
                "Return to the start screen before starting a new attempt."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_cause() {
        let err = ExamError::LoadFailure("HTTP error! status: 404".into());
        assert!(err.to_string().contains("404"));
        assert!(err.user_message().starts_with("Failed to load"));
    }

    #[test]
    fn empty_bank_message() {
        assert_eq!(
            ExamError::EmptyBankAttempt.user_message(),
            "No questions loaded. Cannot start the exam."
        );
    }
}
