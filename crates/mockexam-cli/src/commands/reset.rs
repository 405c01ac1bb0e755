//! The `mockexam reset` command.

use std::path::PathBuf;

use anyhow::Result;

use mockexam_core::session::START_TIME_KEY;
use mockexam_core::traits::SessionStore;
use mockexam_sources::config::load_config_from;
use mockexam_store::JsonFileStore;

pub fn execute(config_path: Option<PathBuf>, state_file: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonFileStore::new(state_file.unwrap_or(config.state_file));

    if store.get(START_TIME_KEY)?.is_none() {
        println!("No exam in progress.");
        return Ok(());
    }

    store.remove(START_TIME_KEY)?;
    tracing::info!(path = %store.path().display(), "cleared exam clock");
    println!("Exam clock cleared. The next `mockexam run` starts fresh.");
    Ok(())
}
