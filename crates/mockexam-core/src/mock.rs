//! Test doubles for the session collaborators.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::{Options, Question};
use crate::scoring::ExamResults;
use crate::traits::{ExamView, FlaggedQuestion, Progress, QuestionSource, Screen, SessionStore};

/// Build `n` questions whose correct answer is always `"A"`.
pub fn sample_bank(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            question: format!("Question {i}"),
            options: Options::Keyed(
                [("A", "right"), ("B", "wrong"), ("C", "also wrong")]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            answer: "A".into(),
            reference: Some(format!("Section {i}")),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A question source returning a fixed bank, or failing every time.
pub struct MockSource {
    bank: Option<Vec<Question>>,
    call_count: AtomicU32,
}

impl MockSource {
    pub fn new(bank: Vec<Question>) -> Self {
        Self {
            bank: Some(bank),
            call_count: AtomicU32::new(0),
        }
    }

    /// A source whose fetch always fails.
    pub fn failing() -> Self {
        Self {
            bank: None,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self) -> anyhow::Result<Vec<Question>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.bank {
            Some(bank) => Ok(bank.clone()),
            None => anyhow::bail!("HTTP error! status: 500"),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory store that counts writes and can be switched to fail.
#[derive(Default)]
pub struct MockStore {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicU32,
    removals: AtomicU32,
    failing: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn removals(&self) -> u32 {
        self.removals.load(Ordering::Relaxed)
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::Relaxed) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }
}

impl SessionStore for MockStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.check()?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.check()?;
        self.removals.fetch_add(1, Ordering::Relaxed);
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Everything the session asked the view to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Screen(Screen),
    Error(String),
    CreateProgress(usize),
    Progress(Progress),
    Question {
        number: usize,
        total: usize,
        selected: Option<String>,
    },
    FlagButton(bool),
    Navigation {
        prev_enabled: bool,
        next_enabled: bool,
    },
    Timer(u64),
    Flagged(Vec<FlaggedQuestion>),
    Results(ExamResults),
    Confirm(String),
}

/// A view that records calls and answers confirmations from a script.
///
/// When the script runs out, confirmations return the default answer.
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    confirmations: Mutex<VecDeque<bool>>,
    default_confirm: bool,
    hang: AtomicBool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::with_default_confirm(true)
    }

    pub fn with_default_confirm(default_confirm: bool) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirmations: Mutex::new(VecDeque::new()),
            default_confirm,
            hang: AtomicBool::new(false),
        }
    }

    /// Make every later confirmation wait forever, like a user who never
    /// answers.
    pub fn hang_confirmations(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    /// Queue answers for the next confirmation requests.
    pub fn script_confirmations(&self, answers: &[bool]) {
        self.confirmations.lock().unwrap().extend(answers);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn last_screen(&self) -> Option<Screen> {
        self.events().iter().rev().find_map(|e| match e {
            ViewEvent::Screen(s) => Some(*s),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn confirm_prompts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Confirm(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<ExamResults> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Results(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn last_timer(&self) -> Option<u64> {
        self.events().iter().rev().find_map(|e| match e {
            ViewEvent::Timer(t) => Some(*t),
            _ => None,
        })
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Default for RecordingView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExamView for RecordingView {
    fn show_screen(&self, screen: Screen) {
        self.push(ViewEvent::Screen(screen));
    }

    fn show_error(&self, message: &str) {
        self.push(ViewEvent::Error(message.to_string()));
    }

    fn create_progress(&self, total: usize) {
        self.push(ViewEvent::CreateProgress(total));
    }

    fn update_progress(&self, progress: &Progress) {
        self.push(ViewEvent::Progress(progress.clone()));
    }

    fn render_question(
        &self,
        _question: &Question,
        selected: Option<&str>,
        number: usize,
        total: usize,
    ) {
        self.push(ViewEvent::Question {
            number,
            total,
            selected: selected.map(str::to_string),
        });
    }

    fn update_flag_button(&self, flagged: bool) {
        self.push(ViewEvent::FlagButton(flagged));
    }

    fn update_navigation(&self, prev_enabled: bool, next_enabled: bool) {
        self.push(ViewEvent::Navigation {
            prev_enabled,
            next_enabled,
        });
    }

    fn update_timer(&self, seconds_left: u64) {
        self.push(ViewEvent::Timer(seconds_left));
    }

    fn show_flagged(&self, flagged: &[FlaggedQuestion]) {
        self.push(ViewEvent::Flagged(flagged.to_vec()));
    }

    fn render_results(&self, results: &ExamResults) {
        self.push(ViewEvent::Results(results.clone()));
    }

    async fn confirm(&self, message: &str) -> bool {
        self.push(ViewEvent::Confirm(message.to_string()));
        if self.hang.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }
        self.confirmations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_confirm)
    }
}
