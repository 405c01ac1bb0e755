//! The `mockexam status` command.

use std::path::PathBuf;

use anyhow::Result;

use mockexam_core::clock::{Clock, SystemClock};
use mockexam_core::session::START_TIME_KEY;
use mockexam_core::timer::{format_time, is_plausible_start, remaining_secs};
use mockexam_core::traits::SessionStore;
use mockexam_sources::config::load_config_from;
use mockexam_store::JsonFileStore;

pub fn execute(config_path: Option<PathBuf>, state_file: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonFileStore::new(state_file.unwrap_or(config.state_file));

    let Some(raw) = store.get(START_TIME_KEY)? else {
        println!("No exam in progress.");
        return Ok(());
    };
    let started: i64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid start time in {}: {raw}", store.path().display()))?;

    let now = SystemClock.now_ms();
    if !is_plausible_start(config.duration_secs, started, now) {
        anyhow::bail!(
            "invalid start time in {}: {raw}. Run `mockexam reset` to clear it.",
            store.path().display()
        );
    }

    let left = remaining_secs(config.duration_secs, started, now);
    if left == 0 {
        println!("Time is up. The attempt is submitted when you next run `mockexam run`.");
    } else {
        println!("Exam in progress: {} remaining.", format_time(left));
    }
    Ok(())
}
