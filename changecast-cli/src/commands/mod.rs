pub mod generate;
pub mod history;
pub mod publish;
pub mod serve;
pub mod since;

use anyhow::{Context, Result};
use changecast_core::history::DEFAULT_RECENT_LIMIT;
use changecast_core::HistoryStore;
use colored::Colorize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::warn;

pub fn open_store(path: &std::path::Path) -> HistoryStore {
    let store = HistoryStore::new(path);
    if let Err(e) = store.initialize() {
        warn!("Could not initialize history store {:?}: {}", path, e);
    }
    store
}

/// Lets the user pick a recent repository or type a new URL.
pub fn select_repository(store: &HistoryStore) -> Result<String> {
    let recent = store.recent_repositories(DEFAULT_RECENT_LIMIT);

    if !recent.is_empty() {
        let mut items: Vec<String> = recent
            .iter()
            .map(|r| format!("{} {}", r.name.bold(), r.url.dimmed()))
            .collect();
        items.push("Enter a new repository URL".to_string());

        let choice = Select::new()
            .with_prompt("Repository")
            .items(&items)
            .default(0)
            .interact()
            .context("Repository selection was cancelled")?;

        if let Some(record) = recent.get(choice) {
            return Ok(record.url.clone());
        }
    }

    let url: String = Input::new()
        .with_prompt("GitHub repository URL")
        .interact_text()
        .context("No repository URL entered")?;

    Ok(url.trim().to_string())
}

pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
