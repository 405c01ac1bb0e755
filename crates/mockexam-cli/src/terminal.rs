//! Line-oriented terminal front end for an exam session.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use mockexam_core::scoring::ExamResults;
use mockexam_core::timer::format_time;
use mockexam_core::traits::{ExamView, FlaggedQuestion, Progress, Screen};
use mockexam_core::Question;

type LineSource = Lines<Box<dyn AsyncBufRead + Send + Unpin>>;

/// Shared line reader. The driver loop and confirmation prompts read from the
/// same input, one line at a time.
#[derive(Clone)]
pub struct TerminalInput {
    lines: Arc<tokio::sync::Mutex<LineSource>>,
}

impl TerminalInput {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        let reader: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: Arc::new(tokio::sync::Mutex::new(reader.lines())),
        }
    }

    /// Next input line, `None` at end of input. Cancel-safe.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Remaining-time marks at which a reminder is printed.
const TIME_WARNINGS: [u64; 3] = [600, 300, 60];

#[derive(Default)]
struct ViewState {
    progress: Option<Progress>,
    timer_announced: bool,
}

/// An `ExamView` printing to stdout and reading confirmations from input.
pub struct TerminalView {
    input: TerminalInput,
    state: Mutex<ViewState>,
}

impl TerminalView {
    pub fn new(input: TerminalInput) -> Self {
        Self {
            input,
            state: Mutex::new(ViewState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ExamView for TerminalView {
    fn show_screen(&self, screen: Screen) {
        match screen {
            Screen::Start => {
                println!("\nType `start` to begin the exam, `help` for commands, `q` to quit.")
            }
            Screen::Exam => println!("\nExam started. Type `help` for commands."),
            Screen::Results => println!("\n=== Results ==="),
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("{message}");
    }

    fn create_progress(&self, total: usize) {
        let mut state = self.state();
        state.progress = Some(Progress {
            current: 0,
            items: vec![Default::default(); total],
        });
        state.timer_announced = false;
    }

    fn update_progress(&self, progress: &Progress) {
        self.state().progress = Some(progress.clone());
    }

    fn render_question(
        &self,
        question: &Question,
        selected: Option<&str>,
        number: usize,
        total: usize,
    ) {
        println!("\nQuestion {number}/{total}");
        println!("{}", question.question);
        for (i, choice) in question.choices().iter().enumerate() {
            let mark = if selected == Some(choice.id.as_str()) {
                "x"
            } else {
                " "
            };
            if choice.id == choice.text {
                println!("  [{mark}] {}) {}", i + 1, choice.text);
            } else {
                println!("  [{mark}] {}) {}. {}", i + 1, choice.id, choice.text);
            }
        }
    }

    fn update_flag_button(&self, flagged: bool) {
        if flagged {
            println!("  (flagged for review)");
        }
    }

    fn update_navigation(&self, prev_enabled: bool, next_enabled: bool) {
        let mut hints = Vec::new();
        if prev_enabled {
            hints.push("[p]rev");
        }
        if next_enabled {
            hints.push("[n]ext");
        }
        hints.extend(["[f]lag", "[s]ubmit", "[t]ime"]);

        let summary = self
            .state()
            .progress
            .as_ref()
            .map(|p| {
                format!(
                    "answered {}/{}, flagged {}",
                    p.answered(),
                    p.total(),
                    p.flagged()
                )
            })
            .unwrap_or_default();
        println!("  {}  | {summary}", hints.join(" "));
    }

    fn update_timer(&self, seconds_left: u64) {
        let first = {
            let mut state = self.state();
            !std::mem::replace(&mut state.timer_announced, true)
        };
        if first {
            println!("Time remaining: {}", format_time(seconds_left));
        } else if seconds_left == 0 {
            println!("\nTime is up.");
        } else if TIME_WARNINGS.contains(&seconds_left) {
            println!("\n{} remaining.", format_time(seconds_left));
        }
    }

    fn show_flagged(&self, flagged: &[FlaggedQuestion]) {
        println!("\nYou have flagged questions. Review them before submitting:");
        for f in flagged {
            println!("  Q{}: {}", f.index + 1, f.text);
        }
        println!("Go to a question with `g <number>` and unflag it with `f`.");
    }

    fn render_results(&self, results: &ExamResults) {
        println!(
            "Score: {}% ({} of {} correct)",
            results.percentage, results.correct_answers, results.total_questions
        );

        let mut table = Table::new();
        table.set_header(vec!["#", "Result", "Your answer", "Correct answer", "Reference"]);
        for (i, r) in results.results.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(if r.is_correct { "correct" } else { "wrong" }),
                Cell::new(r.answer_label()),
                Cell::new(&r.correct_answer),
                Cell::new(r.reference.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");
        println!("Type `r` to return to the start screen for a new attempt, or `q` to quit.");
    }

    async fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        let _ = std::io::stdout().flush();
        match self.input.next_line().await {
            Ok(Some(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("failed to read confirmation: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn input_reads_lines_until_eof() {
        let input = TerminalInput::from_reader(&b"start\nnext\n"[..]);
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("start"));
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("next"));
        assert_eq!(input.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn confirm_accepts_only_yes() {
        let input = TerminalInput::from_reader(&b"y\nYES\nn\nmaybe\n"[..]);
        let view = TerminalView::new(input);
        assert!(view.confirm("Submit?").await);
        assert!(view.confirm("Submit?").await);
        assert!(!view.confirm("Submit?").await);
        assert!(!view.confirm("Submit?").await);
        // End of input declines.
        assert!(!view.confirm("Submit?").await);
    }

    #[tokio::test]
    async fn view_and_driver_share_input() {
        let input = TerminalInput::from_reader(&b"s\ny\nq\n"[..]);
        let view = TerminalView::new(input.clone());
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("s"));
        assert!(view.confirm("Submit?").await);
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("q"));
    }
}
