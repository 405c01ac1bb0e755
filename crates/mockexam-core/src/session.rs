//! The exam session state machine.
//!
//! `Unloaded → Loaded → InProgress → Submitted`, with restart returning to
//! `Loaded` (bank kept, no reshuffle). One session drives one view; the timer
//! task only produces [`Tick`]s, which the owner feeds back through
//! [`ExamSession::handle_tick`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::ExamError;
use crate::model::Question;
use crate::report::ExamReport;
use crate::scoring::{self, ExamResults};
use crate::shuffle::{prepare_bank, ShuffleMode};
use crate::timer::{is_plausible_start, remaining_ms, remaining_secs, Tick, TimerHandle};
use crate::traits::{
    ExamView, FlaggedQuestion, Progress, ProgressItem, QuestionSource, Screen, SessionStore,
};

/// Exam length in seconds (3 hours).
pub const EXAM_DURATION_SECS: u64 = 180 * 60;
/// Number of questions kept after shuffling.
pub const TOTAL_QUESTIONS: usize = 100;
/// Store key holding the attempt's start time in epoch milliseconds.
pub const START_TIME_KEY: &str = "examStartTime";

/// Configuration for an exam session.
#[derive(Debug, Clone)]
pub struct ExamConfig {
    pub duration_secs: u64,
    pub total_questions: usize,
    pub shuffle: ShuffleMode,
    /// Timer granularity.
    pub tick_interval: Duration,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            duration_secs: EXAM_DURATION_SECS,
            total_questions: TOTAL_QUESTIONS,
            shuffle: ShuffleMode::default(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No bank yet, or loading failed.
    Unloaded,
    /// Bank loaded; start screen.
    Loaded,
    InProgress,
    Submitted,
}

/// What a manual submission attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No attempt was running.
    NotInProgress,
    /// Flagged questions were listed instead of submitting.
    FlaggedPending { count: usize },
    /// The user declined the confirmation.
    Declined,
    Submitted,
    /// Time ran out while the confirmation was pending; the attempt was
    /// submitted automatically.
    TimeExpired,
}

/// A single exam session.
pub struct ExamSession {
    config: ExamConfig,
    source: Arc<dyn QuestionSource>,
    store: Arc<dyn SessionStore>,
    view: Arc<dyn ExamView>,
    clock: Arc<dyn Clock>,
    questions: Vec<Question>,
    current: usize,
    answers: BTreeMap<usize, String>,
    flags: BTreeSet<usize>,
    phase: Phase,
    load_error: Option<ExamError>,
    started_at_ms: Option<i64>,
    attempt: u64,
    timer: Option<TimerHandle>,
    tick_tx: mpsc::UnboundedSender<Tick>,
    tick_rx: Option<mpsc::UnboundedReceiver<Tick>>,
    results: Option<ExamResults>,
    time_used_secs: u64,
    auto_submitted: bool,
}

impl ExamSession {
    pub fn new(
        config: ExamConfig,
        source: Arc<dyn QuestionSource>,
        store: Arc<dyn SessionStore>,
        view: Arc<dyn ExamView>,
    ) -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        Self {
            config,
            source,
            store,
            view,
            clock: Arc::new(SystemClock),
            questions: Vec::new(),
            current: 0,
            answers: BTreeMap::new(),
            flags: BTreeSet::new(),
            phase: Phase::Unloaded,
            load_error: None,
            started_at_ms: None,
            attempt: 0,
            timer: None,
            tick_tx,
            tick_rx: Some(tick_rx),
            results: None,
            time_used_secs: 0,
            auto_submitted: false,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Take the receiving end of the timer channel. Returns `None` after the
    /// first call.
    pub fn take_ticks(&mut self) -> Option<mpsc::UnboundedReceiver<Tick>> {
        self.tick_rx.take()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    pub fn flags(&self) -> &BTreeSet<usize> {
        &self.flags
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flags.contains(&index)
    }

    pub fn unanswered_count(&self) -> usize {
        self.questions.len().saturating_sub(self.answers.len())
    }

    /// Number of attempts started in this session; tags timer ticks.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// The error from the last `init`, if it failed.
    pub fn load_error(&self) -> Option<&ExamError> {
        self.load_error.as_ref()
    }

    pub fn load_failed(&self) -> bool {
        self.load_error.is_some()
    }

    pub fn started_at_ms(&self) -> Option<i64> {
        self.started_at_ms
    }

    pub fn has_active_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Results of the last submitted attempt.
    pub fn results(&self) -> Option<&ExamResults> {
        self.results.as_ref()
    }

    pub fn auto_submitted(&self) -> bool {
        self.auto_submitted
    }

    /// Snapshot of the progress indicator.
    pub fn progress(&self) -> Progress {
        Progress {
            current: self.current,
            items: (0..self.questions.len())
                .map(|i| ProgressItem {
                    answered: self.answers.contains_key(&i),
                    flagged: self.flags.contains(&i),
                })
                .collect(),
        }
    }

    /// Seconds left in the running attempt, derived from the start timestamp.
    /// The full duration when no attempt is running.
    pub fn time_left(&self) -> u64 {
        match self.started_at_ms {
            Some(started) => {
                remaining_secs(self.config.duration_secs, started, self.clock.now_ms())
            }
            None => self.config.duration_secs,
        }
    }

    fn ms_left(&self) -> u64 {
        match self.started_at_ms {
            Some(started) => {
                remaining_ms(self.config.duration_secs, started, self.clock.now_ms())
            }
            None => self.config.duration_secs.saturating_mul(1000),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Load, shuffle and truncate the question bank.
    ///
    /// A failure is reported to the view and leaves the session `Unloaded`;
    /// calling `init` again retries.
    pub async fn init(&mut self) -> Result<(), ExamError> {
        if self.phase != Phase::Unloaded {
            debug!("question bank already loaded");
            return Ok(());
        }

        match self.source.fetch().await {
            Ok(all) => {
                let available = all.len();
                let mut shuffler = self.config.shuffle.shuffler(self.clock.now_ms());
                self.questions = prepare_bank(all, &mut shuffler, self.config.total_questions);
                self.load_error = None;
                self.phase = Phase::Loaded;
                info!(
                    source = %self.source.name(),
                    available,
                    selected = self.questions.len(),
                    "question bank loaded"
                );
                self.view.show_screen(Screen::Start);
                Ok(())
            }
            Err(e) => {
                tracing::error!("could not load questions from {}: {e:#}", self.source.name());
                let err = ExamError::LoadFailure(format!("{e:#}"));
                self.view.show_error(err.user_message());
                self.load_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Begin a new attempt with a fresh start time.
    ///
    /// Only valid from the start screen; a running or submitted attempt has to
    /// be left with [`restart_exam`](Self::restart_exam) first.
    pub fn start_exam(&mut self) -> Result<(), ExamError> {
        if self.questions.is_empty() {
            let err = ExamError::EmptyBankAttempt;
            self.view.show_error(err.user_message());
            return Err(err);
        }
        if self.phase != Phase::Loaded {
            debug!(phase = ?self.phase, "start ignored outside the start screen");
            let err = ExamError::NotAtStartScreen;
            self.view.show_error(err.user_message());
            return Err(err);
        }

        let now = self.clock.now_ms();
        if let Err(e) = self.store.set(START_TIME_KEY, &now.to_string()) {
            warn!("failed to persist exam start time: {e:#}");
        }
        info!(attempt = self.attempt + 1, questions = self.questions.len(), "exam started");
        self.begin_attempt(now);
        Ok(())
    }

    /// Continue an attempt whose start time survived a restart.
    ///
    /// Answers, flags and position are not persisted and start empty. Returns
    /// `true` if an attempt was resumed (possibly straight into auto-submit).
    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Loaded || self.questions.is_empty() {
            return false;
        }

        let raw = match self.store.get(START_TIME_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                warn!("failed to read persisted start time: {e:#}");
                return false;
            }
        };

        let started = raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|&t| is_plausible_start(self.config.duration_secs, t, self.clock.now_ms()));
        let Some(started) = started else {
            warn!(value = %raw, "discarding invalid persisted start time");
            if let Err(e) = self.store.remove(START_TIME_KEY) {
                warn!("failed to clear persisted start time: {e:#}");
            }
            return false;
        };

        info!(started_at_ms = started, "resuming exam from persisted start time");
        self.begin_attempt(started);
        true
    }

    fn begin_attempt(&mut self, started_at_ms: i64) {
        self.stop_timer();
        self.attempt += 1;
        self.current = 0;
        self.answers.clear();
        self.flags.clear();
        self.results = None;
        self.time_used_secs = 0;
        self.auto_submitted = false;
        self.started_at_ms = Some(started_at_ms);
        self.phase = Phase::InProgress;

        self.view.show_screen(Screen::Exam);
        self.view.create_progress(self.questions.len());
        self.show_question(0);

        let left = self.time_left();
        self.view.update_timer(left);
        if left == 0 {
            info!("resumed attempt has no time left, submitting automatically");
            self.auto_submit();
            return;
        }

        self.timer = Some(TimerHandle::spawn(
            self.attempt,
            self.config.tick_interval,
            self.tick_tx.clone(),
        ));
    }

    // -----------------------------------------------------------------------
    // Navigation, answers and flags
    // -----------------------------------------------------------------------

    /// Display question `index`. Out-of-range indices are ignored.
    pub fn show_question(&mut self, index: usize) {
        if self.phase != Phase::InProgress || index >= self.questions.len() {
            debug!(index, "ignoring navigation");
            return;
        }
        self.current = index;

        let total = self.questions.len();
        self.view.render_question(
            &self.questions[index],
            self.answers.get(&index).map(String::as_str),
            index + 1,
            total,
        );
        self.refresh_progress();
        self.view.update_flag_button(self.flags.contains(&index));
        self.view.update_navigation(index > 0, index + 1 < total);
    }

    pub fn next_question(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.show_question(self.current + 1);
        }
    }

    pub fn prev_question(&mut self) {
        if self.current > 0 {
            self.show_question(self.current - 1);
        }
    }

    pub fn go_to_question(&mut self, index: usize) {
        self.show_question(index);
    }

    /// Record or overwrite the answer for question `index`.
    ///
    /// The answer is not checked against the offered choices.
    pub fn select_answer(&mut self, index: usize, answer: impl Into<String>) {
        if self.phase != Phase::InProgress || index >= self.questions.len() {
            debug!(index, "ignoring answer");
            return;
        }
        self.answers.insert(index, answer.into());
        self.refresh_progress();
    }

    /// Flip the review flag of the current question.
    pub fn toggle_flag(&mut self) {
        if self.phase != Phase::InProgress || self.questions.is_empty() {
            return;
        }
        let index = self.current;
        if !self.flags.remove(&index) {
            self.flags.insert(index);
        }
        self.view.update_flag_button(self.flags.contains(&index));
        self.refresh_progress();
    }

    fn refresh_progress(&self) {
        self.view.update_progress(&self.progress());
    }

    // -----------------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------------

    /// React to a timer tick. Returns `true` if the tick ended the attempt.
    ///
    /// Ticks from a previous attempt, or arriving outside an attempt, are
    /// ignored.
    pub fn handle_tick(&mut self, tick: Tick) -> bool {
        if self.phase != Phase::InProgress || tick.attempt != self.attempt {
            debug!(tick = tick.attempt, current = self.attempt, "ignoring stale tick");
            return false;
        }

        let left = self.time_left();
        self.view.update_timer(left);
        if left == 0 {
            info!("time is up, submitting automatically");
            self.auto_submit();
            return true;
        }
        false
    }

    fn auto_submit(&mut self) {
        self.auto_submitted = true;
        self.submit_exam();
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!(attempt = timer.attempt(), "stopping timer");
            timer.cancel();
        }
    }

    fn clear_clock(&mut self) {
        if self.started_at_ms.take().is_some() {
            if let Err(e) = self.store.remove(START_TIME_KEY) {
                warn!("failed to clear persisted start time: {e:#}");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Manual submission.
    ///
    /// Flagged questions block submission and are listed instead. Otherwise
    /// the user must confirm, with the unanswered count named if there is one.
    /// The confirmation is bounded by the remaining time: if the deadline
    /// passes first, the attempt is submitted automatically.
    pub async fn handle_submit_attempt(&mut self) -> SubmitOutcome {
        if self.phase != Phase::InProgress {
            return SubmitOutcome::NotInProgress;
        }
        if self.time_left() == 0 {
            self.expire();
            return SubmitOutcome::TimeExpired;
        }

        if !self.flags.is_empty() {
            let flagged: Vec<FlaggedQuestion> = self
                .flags
                .iter()
                .map(|&index| FlaggedQuestion {
                    index,
                    text: self.questions[index].question.clone(),
                })
                .collect();
            self.view.show_flagged(&flagged);
            return SubmitOutcome::FlaggedPending {
                count: flagged.len(),
            };
        }

        let unanswered = self.unanswered_count();
        let message = if unanswered > 0 {
            format!(
                "You have {unanswered} unanswered question(s). Are you sure you want to submit?"
            )
        } else {
            "Are you sure you want to submit the exam?".to_string()
        };

        let view = Arc::clone(&self.view);
        let deadline = Duration::from_millis(self.ms_left());
        let confirmed = match tokio::time::timeout(deadline, view.confirm(&message)).await {
            Ok(confirmed) => confirmed,
            Err(_) => {
                info!("time ran out while awaiting confirmation");
                self.expire();
                return SubmitOutcome::TimeExpired;
            }
        };

        if self.time_left() == 0 {
            self.expire();
            return SubmitOutcome::TimeExpired;
        }
        if !confirmed {
            debug!("submission declined");
            return SubmitOutcome::Declined;
        }

        self.submit_exam();
        SubmitOutcome::Submitted
    }

    fn expire(&mut self) {
        self.view.update_timer(0);
        self.auto_submit();
    }

    /// Stop the timer, clear the persisted clock and show the results.
    ///
    /// Only the first call of an attempt has an effect.
    pub fn submit_exam(&mut self) {
        self.stop_timer();
        if self.phase != Phase::InProgress {
            debug!("submit ignored, no attempt in progress");
            return;
        }

        self.time_used_secs = if self.auto_submitted {
            self.config.duration_secs
        } else {
            self.config.duration_secs.saturating_sub(self.time_left())
        };
        self.clear_clock();
        self.phase = Phase::Submitted;
        self.view.show_screen(Screen::Results);

        let results = self.calculate_results();
        info!(
            correct = results.correct_answers,
            total = results.total_questions,
            percentage = results.percentage,
            auto_submitted = self.auto_submitted,
            "exam submitted"
        );
        self.view.render_results(&results);
        self.results = Some(results);
    }

    /// Score the current answers.
    pub fn calculate_results(&self) -> ExamResults {
        scoring::calculate_results(&self.questions, &self.answers)
    }

    /// Abandon or leave the attempt and return to the start screen.
    pub fn restart_exam(&mut self) {
        self.stop_timer();
        if self.phase == Phase::Unloaded {
            return;
        }
        self.clear_clock();
        self.phase = Phase::Loaded;
        info!("returned to start screen");
        self.view.show_screen(Screen::Start);
    }

    /// Report of the last submitted attempt.
    pub fn report(&self) -> Option<ExamReport> {
        self.results.as_ref().map(|results| {
            ExamReport::new(
                self.source.name(),
                results,
                self.time_used_secs,
                self.config.duration_secs,
                self.auto_submitted,
            )
        })
    }
}
