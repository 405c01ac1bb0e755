//! The `mockexam validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mockexam_core::parser::{parse_bank, validate_bank};

pub fn execute(path: PathBuf) -> Result<()> {
    let questions = parse_bank(&path)?;
    println!(
        "Question bank: {} ({} questions)",
        path.display(),
        questions.len()
    );

    let warnings = validate_bank(&questions);
    for w in &warnings {
        let prefix = w
            .index
            .map(|i| format!("  [#{}]", i + 1))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
