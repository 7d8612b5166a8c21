use anyhow::Result;
use changecast_core::history::new_commits_since_last_changelog;
use changecast_core::{Config, RepoRef};
use changecast_sdk::GitHubClient;
use colored::Colorize;

use crate::display;

pub async fn run(repo: String, config: &Config) -> Result<()> {
    let repo_url = repo.trim().to_string();
    let repo = RepoRef::parse(&repo_url)?;
    let store = super::open_store(&config.history_path);

    let Some(last_run) = store.last_run_info(&repo_url) else {
        println!("{}", format!("No changelog generated yet for {}", repo).yellow());
        println!(
            "Run {} to create one",
            format!("changecast generate {}", repo_url).cyan()
        );
        return Ok(());
    };

    println!("{}", format!("Since Last Changelog: {}", repo).bold().cyan());
    println!(
        "  {}: {}",
        "Generated".bold(),
        last_run.last_date.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  {}: {}", "Age".bold(), display::days_ago(last_run.days));
    if let Some(hash) = &last_run.last_commit_hash {
        println!("  {}: {}", "Last commit".bold(), hash);
    }

    let github = GitHubClient::from_config(config)?;
    let bar = super::spinner("Checking for new commits...");
    let new_commits = new_commits_since_last_changelog(&store, &github, &repo_url).await;
    bar.finish_and_clear();

    println!("  {}: {}", "New commits".bold(), new_commits?);

    Ok(())
}
