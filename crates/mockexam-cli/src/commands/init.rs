//! The `mockexam init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing("mockexam.toml", SAMPLE_CONFIG)?;
    write_if_missing("questions.json", SAMPLE_BANK)?;

    println!("\nNext steps:");
    println!("  1. Replace questions.json with your own question bank");
    println!("  2. Run: mockexam validate --questions questions.json");
    println!("  3. Run: mockexam run");

    Ok(())
}

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mockexam configuration

# duration_secs = 10800
# total_questions = 100

# "random", or "seeded" for a reproducible order
shuffle = "random"
# seed = 42

state_file = ".mockexam/state.json"
# report_dir = "mockexam-reports"

[source]
type = "file"
path = "questions.json"

# [source]
# type = "http"
# url = "https://example.com/questions.json"
"#;

const SAMPLE_BANK: &str = r#"[
  {
    "question": "Which planet is closest to the Sun?",
    "options": { "A": "Venus", "B": "Mercury", "C": "Mars", "D": "Earth" },
    "answer": "B",
    "reference": "Astronomy 1.1"
  },
  {
    "question": "What is the chemical symbol for gold?",
    "options": { "A": "Ag", "B": "Gd", "C": "Au", "D": "Go" },
    "answer": "C",
    "reference": "Chemistry 2.4"
  },
  {
    "question": "How many sides does a hexagon have?",
    "options": ["5", "6", "7", "8"],
    "answer": "6"
  },
  {
    "question": "Which data structure is last in, first out?",
    "options": { "A": "Queue", "B": "Stack", "C": "Heap", "D": "Tree" },
    "answer": "B",
    "reference": "Data Structures 3.2"
  },
  {
    "question": "What is 7 multiplied by 8?",
    "options": ["54", "56", "58", "64"],
    "answer": "56"
  }
]
"#;
