use anyhow::{Context, Result};
use changecast_core::diff::EditDiff;
use changecast_core::history::new_commits_since_last_changelog;
use changecast_core::source::validate_days;
use changecast_core::{
    classify, render, ChangelogDocument, Commit, Config, DateRange, LastRun, Layout, RepoRef,
};
use changecast_sdk::{GitHubClient, Summarizer, Summary};
use clap::ValueEnum;
use colored::Colorize;
use dialoguer::{Confirm, Editor};
use std::path::PathBuf;
use tracing::warn;

use super::publish;
use crate::display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    Internal,
    External,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Internal => Layout::Internal,
            LayoutArg::External => Layout::External,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PublishTarget {
    None,
    File,
    Server,
    Release,
}

pub struct GenerateArgs {
    pub repo: Option<String>,
    pub days: Option<u32>,
    pub layout: Layout,
    pub no_ai: bool,
    pub edit: bool,
    pub publish: PublishTarget,
    pub output: Option<PathBuf>,
    pub server: Option<String>,
    pub tag: Option<String>,
}

pub async fn run(args: GenerateArgs, config: &Config) -> Result<()> {
    let store = super::open_store(&config.history_path);

    let repo_url = match args.repo {
        Some(url) => url.trim().to_string(),
        None => super::select_repository(&store)?,
    };
    let repo = RepoRef::parse(&repo_url)?;
    let github = GitHubClient::from_config(config)?;

    println!("{} {}", "Repository:".bold(), repo.to_string().cyan());

    let last_run = store.last_run_info(&repo_url);
    match &last_run {
        Some(run) => {
            println!(
                "  {}: {} ({})",
                "Last changelog".bold(),
                display::days_ago(run.days),
                run.last_date.format("%Y-%m-%d %H:%M")
            );

            let bar = super::spinner("Checking for new commits...");
            let new_commits = new_commits_since_last_changelog(&store, &github, &repo_url).await;
            bar.finish_and_clear();

            match new_commits {
                Ok(count) => println!("  {}: {}", "New commits".bold(), count),
                Err(e) => warn!("Could not count new commits: {}", e),
            }
        }
        None => println!("  {}", "No previous changelog on record".dimmed()),
    }

    let days = validate_days(resolve_days(args.days, last_run.as_ref(), config.default_days))?;
    let date_range = DateRange::last_days(days)?;
    println!("  {}: {} ({} days)", "Period".bold(), date_range, days);
    println!();

    let bar = super::spinner("Fetching commits...");
    let commits = github.fetch_commits(&repo, days).await;
    bar.finish_and_clear();
    let commits = commits.with_context(|| format!("Failed to fetch commits for {}", repo))?;

    println!("Found {} commit(s)", commits.len().to_string().cyan());

    let document = if commits.is_empty() || args.no_ai {
        render(&repo.name, &classify(&commits), &date_range, args.layout)
    } else {
        let summarizer = Summarizer::from_config(config)?;
        summarize_or_render(&summarizer, &commits, &repo, &date_range, args.layout).await
    };

    let document = if args.edit {
        edit_document(document)?
    } else {
        document
    };

    println!();
    display::print_document(&document);

    match args.publish {
        PublishTarget::None => {}
        PublishTarget::File => {
            let path = args
                .output
                .unwrap_or_else(|| default_output_path(&repo.name, &date_range));
            publish::to_file(&document, &path)?;
        }
        PublishTarget::Server => {
            let url = args.server.unwrap_or_else(|| config.server_url.clone());
            publish::to_server(&document, &url).await?;
        }
        PublishTarget::Release => {
            let tag = args.tag.unwrap_or_else(|| default_tag(&date_range));
            publish::to_release(&github, &repo, &tag, &document).await?;
        }
    }

    if let Err(e) = store.record_generation(
        &repo_url,
        &repo.name,
        date_range.start,
        date_range.end,
        commits.first().map(|c| c.hash.as_str()),
    ) {
        warn!("Could not record this run in {:?}: {}", store.path(), e);
    }

    Ok(())
}

async fn summarize_or_render(
    summarizer: &Summarizer,
    commits: &[Commit],
    repo: &RepoRef,
    date_range: &DateRange,
    layout: Layout,
) -> ChangelogDocument {
    let bar = super::spinner("Summarizing with AI...");
    let summary = summarizer
        .summarize(commits, layout, &repo.name, date_range)
        .await;
    bar.finish_and_clear();

    match summary {
        Summary::Generated(document) => document,
        Summary::Unavailable(reason) => {
            if summarizer.is_available() {
                println!(
                    "{}",
                    format!("AI summary unavailable ({}), using the standard layout", reason)
                        .yellow()
                );
            }
            render(&repo.name, &classify(commits), date_range, layout)
        }
    }
}

fn edit_document(document: ChangelogDocument) -> Result<ChangelogDocument> {
    let edited = Editor::new()
        .extension(".md")
        .edit(&document.content)
        .context("Failed to open the editor")?;

    let Some(edited) = edited else {
        println!("{}", "Editor closed without saving, keeping the original".yellow());
        return Ok(document);
    };

    let diff = EditDiff::between(&document.content, &edited);
    if !diff.has_changes() {
        return Ok(document);
    }

    display::print_edit_diff(&diff);

    let keep = Confirm::new()
        .with_prompt("Keep these edits?")
        .default(true)
        .interact()
        .context("Confirmation was cancelled")?;

    Ok(if keep {
        document.with_content(edited)
    } else {
        document
    })
}

/// Explicit flag, else days since the last run, else the configured default.
fn resolve_days(explicit: Option<u32>, last_run: Option<&LastRun>, default_days: u32) -> u32 {
    explicit
        .or_else(|| {
            last_run
                .map(|run| run.days)
                .filter(|days| *days > 0)
                .and_then(|days| u32::try_from(days).ok())
        })
        .unwrap_or(default_days)
}

fn default_output_path(repo_name: &str, date_range: &DateRange) -> PathBuf {
    PathBuf::from(format!(
        "{}-changelog-{}.md",
        repo_name,
        date_range.end.format("%Y-%m-%d")
    ))
}

fn default_tag(date_range: &DateRange) -> String {
    format!("changelog-{}", date_range.end.format("%Y-%m-%d"))
}
