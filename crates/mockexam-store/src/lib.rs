//! mockexam-store: Key-value persistence for the exam clock.
//!
//! Implements the `SessionStore` trait as a JSON file, so a running attempt
//! survives a restart of the process.

pub mod error;
pub mod file;

pub use error::StoreError;
pub use file::JsonFileStore;
