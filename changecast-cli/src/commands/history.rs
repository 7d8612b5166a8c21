use anyhow::Result;
use changecast_core::history::{DEFAULT_HISTORY_LIMIT, DEFAULT_RECENT_LIMIT};
use changecast_core::{Config, RepoRef};
use colored::Colorize;

pub fn run(repo: Option<String>, limit: Option<usize>, config: &Config) -> Result<()> {
    let store = super::open_store(&config.history_path);

    let Some(repo_url) = repo else {
        let repositories = store.recent_repositories(limit.unwrap_or(DEFAULT_RECENT_LIMIT));

        if repositories.is_empty() {
            println!("{}", "No changelogs generated yet".yellow());
            println!("Run {} to create one", "changecast generate <url>".cyan());
            return Ok(());
        }

        println!("{}", "Recent Repositories".bold().cyan());
        println!();
        for record in &repositories {
            println!(
                "  {} {}",
                record.name.bold(),
                format!("(last used {})", record.last_used.format("%Y-%m-%d %H:%M")).dimmed()
            );
            println!("    {}", record.url);
        }
        return Ok(());
    };

    let repo_url = repo_url.trim().to_string();
    let repo = RepoRef::parse(&repo_url)?;
    let entries = store.history_for(&repo_url, limit.unwrap_or(DEFAULT_HISTORY_LIMIT));

    if entries.is_empty() {
        println!("{}", format!("No history for {}", repo).yellow());
        return Ok(());
    }

    println!("{}", format!("Changelog History: {}", repo).bold().cyan());
    println!();
    for entry in &entries {
        println!(
            "{} {}",
            "run".yellow().bold(),
            entry.generated_at.format("%Y-%m-%d %H:%M:%S").to_string().yellow()
        );
        println!(
            "  {}: {} to {}",
            "Window".bold(),
            entry.start_date,
            entry.end_date
        );
        match &entry.last_commit_hash {
            Some(hash) => println!("  {}: {}", "Last commit".bold(), hash),
            None => println!("  {}: {}", "Last commit".bold(), "none".dimmed()),
        }
        println!();
    }

    Ok(())
}
