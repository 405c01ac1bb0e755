//! Countdown timer task and time arithmetic.
//!
//! The timer never holds the countdown itself. It only wakes the session once
//! per period; remaining time is always recomputed from the persisted start
//! timestamp, so a restarted process shows the same value.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A wake-up from the timer task of a specific attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Attempt number the emitting timer belongs to.
    pub attempt: u64,
}

/// Handle to a running timer task. Dropping the handle aborts the task.
#[derive(Debug)]
pub struct TimerHandle {
    attempt: u64,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Spawn a timer that sends a [`Tick`] every `period`, starting one period
    /// from now. Must be called from within a tokio runtime.
    pub fn spawn(attempt: u64, period: Duration, ticks: mpsc::UnboundedSender<Tick>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of an interval completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                if ticks.send(Tick { attempt }).is_err() {
                    tracing::debug!(attempt, "tick receiver dropped, stopping timer");
                    break;
                }
            }
        });

        Self { attempt, task }
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Stop the timer. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Seconds left of `duration_secs` given a start and a current timestamp.
///
/// Elapsed time is floored to whole seconds. A start in the future counts as
/// zero elapsed.
pub fn remaining_secs(duration_secs: u64, started_at_ms: i64, now_ms: i64) -> u64 {
    let elapsed = now_ms.saturating_sub(started_at_ms).div_euclid(1000).max(0) as u64;
    duration_secs.saturating_sub(elapsed)
}

/// Milliseconds until the deadline. Zero exactly when [`remaining_secs`] is.
pub fn remaining_ms(duration_secs: u64, started_at_ms: i64, now_ms: i64) -> u64 {
    let elapsed = now_ms.saturating_sub(started_at_ms).max(0) as u64;
    duration_secs.saturating_mul(1000).saturating_sub(elapsed)
}

/// Whether a persisted start time could belong to a real attempt: not before
/// the epoch, and not further ahead of `now_ms` than one exam duration.
pub fn is_plausible_start(duration_secs: u64, started_at_ms: i64, now_ms: i64) -> bool {
    let max_ahead = i64::try_from(duration_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
    started_at_ms >= 0 && started_at_ms.saturating_sub(now_ms) <= max_ahead
}

/// Format seconds as `HH:MM:SS`.
pub fn format_time(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_at_start_is_full_duration() {
        assert_eq!(remaining_secs(10_800, 1_000, 1_000), 10_800);
    }

    #[test]
    fn remaining_floors_partial_seconds() {
        assert_eq!(remaining_secs(60, 0, 999), 60);
        assert_eq!(remaining_secs(60, 0, 1_000), 59);
        assert_eq!(remaining_secs(60, 0, 59_999), 1);
    }

    #[test]
    fn remaining_clamps_at_zero() {
        assert_eq!(remaining_secs(60, 0, 60_000), 0);
        assert_eq!(remaining_secs(60, 0, 3_600_000), 0);
    }

    #[test]
    fn future_start_counts_as_no_time_elapsed() {
        assert_eq!(remaining_secs(60, 10_000, 0), 60);
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        assert_eq!(remaining_secs(60, i64::MIN, i64::MAX), 0);
        assert_eq!(remaining_secs(60, i64::MAX, i64::MIN), 60);
        assert_eq!(remaining_ms(60, i64::MIN, 0), 0);
        assert_eq!(remaining_ms(60, i64::MAX, 0), 60_000);
    }

    #[test]
    fn remaining_ms_tracks_the_deadline() {
        assert_eq!(remaining_ms(60, 0, 0), 60_000);
        assert_eq!(remaining_ms(60, 0, 59_999), 1);
        assert_eq!(remaining_ms(60, 0, 60_000), 0);
        assert_eq!(remaining_ms(60, 10_000, 0), 60_000);
    }

    #[test]
    fn plausible_starts() {
        let now = 1_700_000_000_000;
        assert!(is_plausible_start(10_800, now, now));
        assert!(is_plausible_start(10_800, 1_000, now));
        assert!(is_plausible_start(10_800, now + 10_800_000, now));
        assert!(!is_plausible_start(10_800, now + 10_800_001, now));
        assert!(!is_plausible_start(10_800, -1, now));
        assert!(!is_plausible_start(10_800, i64::MIN, now));
        assert!(!is_plausible_start(10_800, i64::MAX, now));
    }

    #[test]
    fn format_time_pads() {
        assert_eq!(format_time(10_800), "03:00:00");
        assert_eq!(format_time(3_599), "00:59:59");
        assert_eq!(format_time(61), "00:01:01");
        assert_eq!(format_time(0), "00:00:00");
    }

    #[tokio::test(start_paused = true)]
    async fn emits_one_tick_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = TimerHandle::spawn(3, Duration::from_secs(1), tx);

        for _ in 0..3 {
            let tick = rx.recv().await.unwrap();
            assert_eq!(tick, Tick { attempt: 3 });
        }
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_before_first_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = TimerHandle::spawn(1, Duration::from_secs(1), tx);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(rx.try_recv().unwrap().attempt, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = TimerHandle::spawn(1, Duration::from_secs(1), tx);
        rx.recv().await.unwrap();

        timer.cancel();
        // Once the task is aborted its sender is dropped and the channel closes.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.recv().await, None);
    }
}
