//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from any user config: runs in `dir` with `HOME` there too.
fn mockexam(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mockexam").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("MOCKEXAM_QUESTIONS")
        .env_remove("MOCKEXAM_STATE_FILE");
    cmd
}

/// Write a bank of `n` questions whose correct answer is always `A`.
fn write_bank(dir: &Path, n: usize) {
    let questions: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "question": format!("Question {i}"),
                "options": {"A": "right", "B": "wrong", "C": "also wrong"},
                "answer": "A",
                "reference": format!("Section {i}")
            })
        })
        .collect();
    std::fs::write(
        dir.join("questions.json"),
        serde_json::to_string_pretty(&questions).unwrap(),
    )
    .unwrap();
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    mockexam(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mockexam.toml"))
        .stdout(predicate::str::contains("Created questions.json"));

    assert!(dir.path().join("mockexam.toml").exists());
    assert!(dir.path().join("questions.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    mockexam(dir.path()).arg("init").assert().success();

    mockexam(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_output_validates_cleanly() {
    let dir = TempDir::new().unwrap();
    mockexam(dir.path()).arg("init").assert().success();

    mockexam(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 questions"))
        .stdout(predicate::str::contains("Question bank valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bad.json"),
        r#"[
            {"question": "Same?", "options": ["a", "b"], "answer": "a"},
            {"question": "Same?", "options": ["a", "b"], "answer": "c"}
        ]"#,
    )
    .unwrap();

    mockexam(dir.path())
        .args(["validate", "--questions", "bad.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    mockexam(dir.path())
        .args(["validate", "--questions", "nonexistent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn full_exam_scores_and_writes_reports() {
    let dir = TempDir::new().unwrap();
    write_bank(dir.path(), 3);

    mockexam(dir.path())
        .args(["run", "--seed", "7", "--output", "out", "--format", "all"])
        .write_stdin("start\nA\nn\nA\nn\nA\ns\ny\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions from questions.json"))
        .stdout(predicate::str::contains(
            "Are you sure you want to submit the exam?",
        ))
        .stdout(predicate::str::contains("Score: 100% (3 of 3 correct)"));

    let mut reports: Vec<_> = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    reports.sort();
    assert_eq!(reports.len(), 2);

    let json = reports
        .iter()
        .find(|p| p.extension().is_some_and(|e| e == "json"))
        .unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(report["percentage"], 100);
    assert_eq!(report["auto_submitted"], false);

    mockexam(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No exam in progress"));
}

#[test]
fn unanswered_questions_are_named_in_the_confirmation() {
    let dir = TempDir::new().unwrap();
    write_bank(dir.path(), 4);

    mockexam(dir.path())
        .arg("run")
        .write_stdin("start\n2\ns\nn\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "You have 3 unanswered question(s). Are you sure you want to submit?",
        ))
        .stdout(predicate::str::contains("Submission cancelled"))
        .stdout(predicate::str::contains("Run `mockexam run` again to resume"));
}

#[test]
fn flagged_questions_block_submission() {
    let dir = TempDir::new().unwrap();
    write_bank(dir.path(), 3);

    mockexam(dir.path())
        .arg("run")
        .write_stdin("start\nf\ns\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("You have flagged questions"))
        .stdout(predicate::str::contains("Q1: Question"))
        .stdout(predicate::str::contains("Score:").not());
}

#[test]
fn start_needs_the_start_screen() {
    let dir = TempDir::new().unwrap();
    write_bank(dir.path(), 2);

    mockexam(dir.path())
        .arg("run")
        .write_stdin("start\nstart\ns\ny\nstart\nr\nstart\nq\n")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Return to the start screen before starting a new attempt.",
        ))
        .stdout(
            predicate::str::contains("Type `r` to return to the start screen, then `start`.")
                .count(2),
        )
        .stdout(predicate::str::contains("Score: 0% (0 of 2 correct)"))
        .stdout(predicate::str::contains("Exam started").count(2));
}

#[test]
fn clock_survives_restart_until_reset() {
    let dir = TempDir::new().unwrap();
    write_bank(dir.path(), 3);

    mockexam(dir.path())
        .arg("run")
        .write_stdin("start\nq\n")
        .assert()
        .success();
    assert!(dir.path().join(".mockexam/state.json").exists());

    mockexam(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam in progress"));

    mockexam(dir.path())
        .arg("run")
        .write_stdin("t\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resumed the exam in progress"))
        .stdout(predicate::str::contains("Time remaining: 02:"));

    mockexam(dir.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam clock cleared"));

    mockexam(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No exam in progress"));
}

#[test]
fn expired_clock_submits_on_resume() {
    let dir = TempDir::new().unwrap();
    write_bank(dir.path(), 2);
    std::fs::create_dir_all(dir.path().join("state")).unwrap();
    std::fs::write(
        dir.path().join("state/clock.json"),
        r#"{"examStartTime": "1000"}"#,
    )
    .unwrap();

    mockexam(dir.path())
        .args(["run", "--state-file", "state/clock.json"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0% (0 of 2 correct)"));
}

#[test]
fn start_requires_a_loadable_bank() {
    let dir = TempDir::new().unwrap();

    mockexam(dir.path())
        .args(["run", "--questions", "missing.json"])
        .write_stdin("start\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load exam questions"));
}

#[test]
fn unknown_report_format() {
    let dir = TempDir::new().unwrap();
    write_bank(dir.path(), 1);

    mockexam(dir.path())
        .args(["run", "--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown report format"));
}

#[test]
fn config_file_selects_the_bank() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("banks")).unwrap();
    write_bank(&dir.path().join("banks"), 2);
    std::fs::write(
        dir.path().join("exam.toml"),
        "total_questions = 1\n\n[source]\ntype = \"file\"\npath = \"banks/questions.json\"\n",
    )
    .unwrap();

    mockexam(dir.path())
        .args(["run", "--config", "exam.toml"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 questions from banks/questions.json"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    mockexam(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Timed multiple-choice mock exams"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    mockexam(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mockexam"));
}
