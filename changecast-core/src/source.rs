use crate::error::{Error, Result};
use crate::models::Commit;
use async_trait::async_trait;
use std::fmt;

/// Owner and name of a hosted repository, parsed from its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Takes the last two path segments of the URL, ignoring a trailing
    /// `/` or `.git`. Accepts scp-style `git@host:owner/repo.git` too.
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let segments: Vec<&str> = trimmed
            .split(['/', ':'])
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [.., owner, name] => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(Error::InvalidRepositoryUrl(url.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Anything that can list a repository's commits, newest first.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Commits authored within the last `days` days.
    async fn commits_since(&self, repo: &RepoRef, days: u32) -> Result<Vec<Commit>>;

    /// The most recent page of commits with no date filter.
    async fn recent_commits(&self, repo: &RepoRef) -> Result<Vec<Commit>>;
}

pub fn validate_days(days: u32) -> Result<u32> {
    if days == 0 {
        return Err(Error::InvalidDays(days));
    }
    Ok(days)
}
