use anyhow::{Context, Result};
use changecast_core::{ChangelogDocument, RepoRef};
use changecast_sdk::{GitHubClient, PublishClient};
use colored::Colorize;
use std::path::Path;

pub fn to_file(document: &ChangelogDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, &document.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} {}",
        "✓ Changelog written to".green().bold(),
        path.display()
    );
    Ok(())
}

pub async fn to_server(document: &ChangelogDocument, url: &str) -> Result<()> {
    let client = PublishClient::new(url);

    if !client.health_check().await? {
        anyhow::bail!(
            "No changelog server at {}. Start one with 'changecast serve'.",
            client.base_url()
        );
    }

    let receipt = client.publish(document).await?;

    println!("{}", "✓ Changelog published".green().bold());
    println!("  {}: {}", "Server".bold(), client.base_url());
    println!("  {}: {}", "ID".bold(), receipt.id);
    Ok(())
}

pub async fn to_release(
    github: &GitHubClient,
    repo: &RepoRef,
    tag: &str,
    document: &ChangelogDocument,
) -> Result<()> {
    let url = github
        .create_release(repo, tag, document)
        .await
        .with_context(|| format!("Failed to create release {} on {}", tag, repo))?;

    println!("{}", "✓ GitHub release created".green().bold());
    println!("  {}: {}", "Tag".bold(), tag);
    println!("  {}: {}", "URL".bold(), url.cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_to_file_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes").join("CHANGELOG.md");
        let doc = ChangelogDocument::new("t", "# widgets - Changelog\n", "r");

        to_file(&doc, &path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# widgets - Changelog\n"
        );
    }
}
