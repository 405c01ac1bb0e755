//! mockexam-report: Results report export.
//!
//! Renders a submitted attempt's `ExamReport` as a self-contained HTML page.

pub mod html;

pub use html::{generate_html, write_html_report};
