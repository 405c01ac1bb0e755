//! mockexam-core: Exam session state machine, scoring, and timer.
//!
//! This crate defines the question model, the collaborator traits a front end
//! implements, and the `ExamSession` that drives a single timed attempt.

pub mod clock;
pub mod error;
pub mod mock;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod shuffle;
pub mod timer;
pub mod traits;

pub use error::ExamError;
pub use model::{Choice, Options, Question};
pub use session::{ExamConfig, ExamSession, Phase, SubmitOutcome};
