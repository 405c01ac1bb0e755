//! The `mockexam run` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use mockexam_core::report::ExamReport;
use mockexam_core::session::{ExamSession, Phase, SubmitOutcome};
use mockexam_core::timer::format_time;
use mockexam_core::{ExamError, Question};
use mockexam_report::html::write_html_report;
use mockexam_sources::config::{load_config_from, ShuffleKind, SourceConfig};
use mockexam_sources::create_source;
use mockexam_store::JsonFileStore;

use crate::terminal::{TerminalInput, TerminalView};

/// Options for `mockexam run`, after CLI parsing.
pub struct RunOptions {
    pub questions: Option<String>,
    pub seed: Option<u32>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
}

/// A line of user input during an exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Next,
    Prev,
    /// 1-based question number.
    GoTo(usize),
    Flag,
    Submit,
    Time,
    Restart,
    Quit,
    Help,
    /// A choice, by 1-based position or identifier.
    Answer(String),
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Command::Empty;
    };

    match head.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "n" | "next" => Command::Next,
        "p" | "prev" => Command::Prev,
        "g" | "goto" => match parts.next().map(str::parse::<usize>) {
            Some(Ok(n)) if n >= 1 => Command::GoTo(n),
            _ => Command::Invalid(format!("usage: g <question number>, got `{line}`")),
        },
        "f" | "flag" => Command::Flag,
        "s" | "submit" => Command::Submit,
        "t" | "time" => Command::Time,
        "r" | "restart" => Command::Restart,
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        _ => Command::Answer(line.to_string()),
    }
}

/// Map user input to a choice identifier of `question`: a 1-based position,
/// or an identifier matched case-insensitively.
pub fn resolve_choice(question: &Question, input: &str) -> Option<String> {
    let choices = question.choices();
    if let Ok(n) = input.parse::<usize>() {
        if let Some(choice) = n.checked_sub(1).and_then(|i| choices.get(i)) {
            return Some(choice.id.clone());
        }
    }
    choices
        .into_iter()
        .find(|c| c.id.eq_ignore_ascii_case(input))
        .map(|c| c.id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Json,
    Html,
}

fn parse_formats(format: &str) -> Result<Vec<ReportFormat>> {
    if format == "all" {
        return Ok(vec![ReportFormat::Json, ReportFormat::Html]);
    }
    format
        .split(',')
        .map(|f| match f.trim() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            other => anyhow::bail!("unknown report format: '{other}' (expected json, html or all)"),
        })
        .collect()
}

pub async fn execute(options: RunOptions) -> Result<()> {
    let formats = parse_formats(&options.format)?;

    let mut config = load_config_from(options.config.as_deref())?;
    if let Some(location) = &options.questions {
        config.source = SourceConfig::from_location(location);
    }
    if let Some(seed) = options.seed {
        config.shuffle = ShuffleKind::Seeded;
        config.seed = Some(seed);
    }
    if let Some(state_file) = options.state_file {
        config.state_file = state_file;
    }
    let output = options.output.or_else(|| config.report_dir.clone());

    let source = create_source(&config.source)?;
    let store = Arc::new(JsonFileStore::new(&config.state_file));
    let input = TerminalInput::stdin();
    let view = Arc::new(TerminalView::new(input.clone()));

    let mut session = ExamSession::new(config.exam_config(), source.clone(), store, view);
    session
        .init()
        .await
        .with_context(|| format!("could not prepare an exam from {}", source.name()))?;
    let mut ticks = session
        .take_ticks()
        .context("timer channel already taken")?;

    println!(
        "mockexam v{}: {} questions from {}, {} allowed.",
        env!("CARGO_PKG_VERSION"),
        session.questions().len(),
        source.name(),
        format_time(config.duration_secs)
    );
    if session.resume() {
        println!("Resumed the exam in progress. Answers from the previous run are not kept.");
    }

    // Attempt whose reports were last written.
    let mut reported: Option<u64> = None;
    loop {
        if session.phase() == Phase::Submitted && reported != Some(session.attempt()) {
            reported = Some(session.attempt());
            if let (Some(report), Some(dir)) = (session.report(), &output) {
                save_reports(&report, dir, &formats)?;
            }
        }

        tokio::select! {
            Some(tick) = ticks.recv() => {
                session.handle_tick(tick);
            }
            line = input.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                if !handle_command(&mut session, parse_command(&line)).await {
                    break;
                }
            }
        }
    }

    if session.phase() == Phase::InProgress {
        println!(
            "The exam clock keeps running ({} left). Run `mockexam run` again to resume.",
            format_time(session.time_left())
        );
    }
    Ok(())
}

/// Apply one command. Returns `false` when the user quits.
async fn handle_command(session: &mut ExamSession, command: Command) -> bool {
    let in_progress = session.phase() == Phase::InProgress;

    match command {
        Command::Quit => return false,
        Command::Empty => {}
        Command::Help => print_help(),
        Command::Invalid(message) => println!("{message}"),
        Command::Start => {
            // The view reports the error itself.
            if let Err(ExamError::NotAtStartScreen) = session.start_exam() {
                println!("Type `r` to return to the start screen, then `start`.");
            }
        }
        Command::Restart => session.restart_exam(),
        _ if !in_progress => println!("No exam in progress. Type `start` to begin."),
        Command::Next => session.next_question(),
        Command::Prev => session.prev_question(),
        Command::GoTo(n) => {
            if n > session.questions().len() {
                println!("There are only {} questions.", session.questions().len());
            } else {
                session.go_to_question(n - 1);
            }
        }
        Command::Flag => session.toggle_flag(),
        Command::Time => println!("Time remaining: {}", format_time(session.time_left())),
        Command::Submit => match session.handle_submit_attempt().await {
            SubmitOutcome::Declined => println!("Submission cancelled."),
            SubmitOutcome::TimeExpired => {
                println!("The exam was submitted automatically because time ran out.")
            }
            SubmitOutcome::FlaggedPending { .. }
            | SubmitOutcome::Submitted
            | SubmitOutcome::NotInProgress => {}
        },
        Command::Answer(input) => {
            let index = session.current_index();
            let choice = session
                .current_question()
                .and_then(|q| resolve_choice(q, &input));
            match choice {
                Some(id) => {
                    session.select_answer(index, id.clone());
                    println!("  Answer for question {}: {id}", index + 1);
                }
                None => println!("Unknown command or choice: `{input}`. Type `help`."),
            }
        }
    }
    true
}

fn save_reports(report: &ExamReport, dir: &Path, formats: &[ReportFormat]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    for format in formats {
        match format {
            ReportFormat::Json => {
                let path = dir.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            ReportFormat::Html => {
                let path = dir.join(format!("report-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
        }
    }
    Ok(())
}

fn print_help() {
    println!(
        "\nCommands:
  start            begin a new attempt
  <n> or <id>      answer the current question (e.g. `2` or `B`)
  n / p            next / previous question
  g <number>       go to a question
  f                flag or unflag the current question
  t                show the time remaining
  s                submit the exam
  r                back to the start screen
  q                quit"
    );
}
