use crate::error::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single commit as delivered by the forge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl Commit {
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
            author: author.into(),
            timestamp,
        }
    }

    /// The 7-character abbreviated hash.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }

    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Feature,
    Fix,
    Performance,
    Breaking,
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Feature => "feature",
            Category::Fix => "fix",
            Category::Performance => "performance",
            Category::Breaking => "breaking",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    pub commit: Commit,
    pub commit_type: String,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Developer-facing, with hashes, authors and dates.
    #[default]
    Internal,
    /// User-facing, provenance-free.
    External,
}

impl Layout {
    pub fn as_str(&self) -> &str {
        match self {
            Layout::Internal => "internal",
            Layout::External => "external",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "internal" => Some(Layout::Internal),
            "external" => Some(Layout::External),
            _ => None,
        }
    }
}

/// The window a changelog covers, at date granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The window ending today (UTC) and reaching back `days` days.
    pub fn last_days(days: u32) -> Result<Self> {
        Self::ending_at(Utc::now().date_naive(), days)
    }

    /// Fails with [`Error::InvalidDays`] when the start would fall before the
    /// earliest representable date.
    pub fn ending_at(end: NaiveDate, days: u32) -> Result<Self> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or(Error::InvalidDays(days))?;
        Ok(Self { start, end })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%B %-d, %Y"),
            self.end.format("%B %-d, %Y")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogDocument {
    pub title: String,
    pub content: String,
    pub date_range: String,
}

impl ChangelogDocument {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        date_range: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            date_range: date_range.into(),
        }
    }

    pub fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    pub url: String,
    pub name: String,
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub repo_url: String,
    pub generated_at: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub last_commit_hash: Option<String>,
}

/// Everything the history file holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreData {
    pub repositories: Vec<RepositoryRecord>,
    pub history: Vec<HistoryEntry>,
}
