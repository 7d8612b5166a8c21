//! File-backed history of changelog runs.
//!
//! The whole store is one JSON document. Every call reads it fully and every
//! mutation rewrites it fully, so two concurrent writers race and the last one
//! wins. A missing or damaged file reads as an empty store.

use crate::error::Result;
use crate::models::{HistoryEntry, RepositoryRecord, StoreData};
use crate::source::{CommitSource, RepoRef};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_RECENT_LIMIT: usize = 5;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Outcome of reading the store file.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRead {
    Intact(StoreData),
    Missing,
    Corrupt(String),
}

impl StoreRead {
    pub fn into_data(self) -> StoreData {
        match self {
            StoreRead::Intact(data) => data,
            StoreRead::Missing | StoreRead::Corrupt(_) => StoreData::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRun {
    /// Whole days since the run, rounded up.
    pub days: i64,
    pub last_date: DateTime<Utc>,
    pub last_commit_hash: Option<String>,
}

/// How many commits landed since the last recorded changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewCommits {
    /// No previous commit hash is on record.
    Unknown,
    Exact(usize),
    /// The previous commit was not in the fetched page; at least this many.
    AtLeast(usize),
}

impl fmt::Display for NewCommits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewCommits::Unknown => write!(f, "unknown (no previous changelog on record)"),
            NewCommits::Exact(n) => write!(f, "{}", n),
            NewCommits::AtLeast(n) => write!(
                f,
                "{}+ (the last recorded commit is older than the fetched page)",
                n
            ),
        }
    }
}

pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a fresh empty store when the file is missing or damaged.
    pub fn initialize(&self) -> Result<()> {
        match self.read() {
            StoreRead::Intact(_) => Ok(()),
            StoreRead::Missing => self.write(&StoreData::default()),
            StoreRead::Corrupt(reason) => {
                warn!("Resetting history store {:?}: {}", self.path, reason);
                self.write(&StoreData::default())
            }
        }
    }

    pub fn read(&self) -> StoreRead {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoreRead::Missing,
            Err(e) => return StoreRead::Corrupt(format!("unreadable: {}", e)),
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => return StoreRead::Corrupt(format!("invalid JSON: {}", e)),
        };

        let (Some(repositories), Some(history)) = (
            value.get("repositories").and_then(|v| v.as_array()),
            value.get("history").and_then(|v| v.as_array()),
        ) else {
            return StoreRead::Corrupt(
                "`repositories` or `history` is missing or not an array".to_string(),
            );
        };

        StoreRead::Intact(StoreData {
            repositories: self.parse_records("repositories", repositories),
            history: self.parse_records("history", history),
        })
    }

    /// Keeps every record that deserializes and drops the rest.
    fn parse_records<T: DeserializeOwned>(
        &self,
        key: &str,
        values: &[serde_json::Value],
    ) -> Vec<T> {
        values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<T>(value.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        "Skipping malformed {} record #{} in {:?}: {}",
                        key, index, self.path, e
                    );
                    None
                }
            })
            .collect()
    }

    fn load(&self) -> StoreData {
        let read = self.read();
        if let StoreRead::Corrupt(reason) = &read {
            warn!("History store {:?} is damaged, treating as empty: {}", self.path, reason);
        }
        read.into_data()
    }

    fn write(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!("Wrote history store {:?}", self.path);
        Ok(())
    }

    pub fn record_generation(
        &self,
        repo_url: &str,
        repo_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        last_commit_hash: Option<&str>,
    ) -> Result<()> {
        self.record_generation_at(
            repo_url,
            repo_name,
            start_date,
            end_date,
            last_commit_hash,
            Utc::now(),
        )
    }

    pub fn record_generation_at(
        &self,
        repo_url: &str,
        repo_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        last_commit_hash: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut data = self.load();

        match data.repositories.iter_mut().find(|r| r.url == repo_url) {
            Some(record) => record.last_used = now,
            None => data.repositories.push(RepositoryRecord {
                url: repo_url.to_string(),
                name: repo_name.to_string(),
                last_used: now,
            }),
        }

        data.history.push(HistoryEntry {
            repo_url: repo_url.to_string(),
            generated_at: now,
            start_date,
            end_date,
            last_commit_hash: last_commit_hash.map(str::to_string),
        });

        self.write(&data)
    }

    pub fn last_run_info(&self, repo_url: &str) -> Option<LastRun> {
        self.last_run_info_at(repo_url, Utc::now())
    }

    pub fn last_run_info_at(&self, repo_url: &str, now: DateTime<Utc>) -> Option<LastRun> {
        let data = self.load();
        let latest = data
            .history
            .into_iter()
            .filter(|entry| entry.repo_url == repo_url)
            .max_by_key(|entry| entry.generated_at)?;

        let elapsed = (now - latest.generated_at).num_milliseconds().max(0);
        let days = (elapsed + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;

        Some(LastRun {
            days,
            last_date: latest.generated_at,
            last_commit_hash: latest.last_commit_hash,
        })
    }

    pub fn recent_repositories(&self, limit: usize) -> Vec<RepositoryRecord> {
        let mut repositories = self.load().repositories;
        repositories.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        repositories.truncate(limit);
        repositories
    }

    pub fn history_for(&self, repo_url: &str, limit: usize) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .load()
            .history
            .into_iter()
            .filter(|entry| entry.repo_url == repo_url)
            .collect();
        entries.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        entries.truncate(limit);
        entries
    }
}

/// Counts commits newer than the one recorded by the last run.
///
/// Only the source's most recent page is scanned; a recorded commit that has
/// scrolled out of that page yields [`NewCommits::AtLeast`].
pub async fn new_commits_since_last_changelog(
    store: &HistoryStore,
    source: &dyn CommitSource,
    repo_url: &str,
) -> Result<NewCommits> {
    let last_hash = match store
        .last_run_info(repo_url)
        .and_then(|run| run.last_commit_hash)
        .filter(|hash| !hash.is_empty())
    {
        Some(hash) => hash,
        None => return Ok(NewCommits::Unknown),
    };

    let repo = RepoRef::parse(repo_url)?;
    let commits = source.recent_commits(&repo).await?;

    match commits.iter().position(|c| c.hash.starts_with(&last_hash)) {
        Some(index) => Ok(NewCommits::Exact(index)),
        None => {
            debug!(
                "Commit {} not found among {} recent commits of {}",
                last_hash,
                commits.len(),
                repo
            );
            Ok(NewCommits::AtLeast(commits.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Commit;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    const URL: &str = "https://github.com/acme/widgets";

    fn store_in(dir: &TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("history.json"))
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn record(store: &HistoryStore, url: &str, hash: Option<&str>, when: DateTime<Utc>) {
        let name = url.rsplit('/').next().unwrap();
        let end = when.date_naive();
        store
            .record_generation_at(url, name, end - Duration::days(7), end, hash, when)
            .unwrap();
    }

    #[test]
    fn test_initialize_creates_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.read(), StoreRead::Missing);
        store.initialize().unwrap();

        assert_eq!(store.read(), StoreRead::Intact(StoreData::default()));
    }

    #[test]
    fn test_structurally_invalid_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"repositories": "not-an-array"}"#).unwrap();

        let read = store.read();
        assert!(matches!(read, StoreRead::Corrupt(_)));
        assert_eq!(read.into_data(), StoreData::default());
        assert!(store.recent_repositories(DEFAULT_RECENT_LIMIT).is_empty());

        store.initialize().unwrap();
        assert_eq!(store.read(), StoreRead::Intact(StoreData::default()));
    }

    #[test]
    fn test_unparseable_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.read(), StoreRead::Corrupt(_)));
        assert!(store.last_run_info(URL).is_none());
    }

    #[test]
    fn test_malformed_record_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let raw = serde_json::json!({
            "repositories": [
                { "url": "https://github.com/acme/other", "name": "other", "lastUsed": "2024-03-01T10:00:00Z" },
                { "url": 42 }
            ],
            "history": [
                {
                    "repoUrl": "https://github.com/acme/other",
                    "generatedAt": "2024-03-01T10:00:00Z",
                    "startDate": "2024-02-23",
                    "endDate": "2024-03-01",
                    "lastCommitHash": "keep"
                },
                { "repoUrl": "https://github.com/acme/other", "generatedAt": "bad" }
            ]
        });
        std::fs::write(store.path(), raw.to_string()).unwrap();

        let data = match store.read() {
            StoreRead::Intact(data) => data,
            other => panic!("expected intact store, got {:?}", other),
        };
        assert_eq!(data.repositories.len(), 1);
        assert_eq!(data.history.len(), 1);

        record(&store, URL, Some("abc"), at(8, 9));

        let data = store.read().into_data();
        assert_eq!(data.repositories.len(), 2);
        assert_eq!(data.history.len(), 2);
        let other = store.history_for("https://github.com/acme/other", DEFAULT_HISTORY_LIMIT);
        assert_eq!(other[0].last_commit_hash.as_deref(), Some("keep"));
    }

    #[test]
    fn test_record_generation_upserts_repository() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for day in 1..=3 {
            record(&store, URL, None, at(day, 12));
        }

        let data = store.read().into_data();
        assert_eq!(data.repositories.len(), 1);
        assert_eq!(data.repositories[0].last_used, at(3, 12));
        assert_eq!(data.history.len(), 3);
    }

    #[test]
    fn test_record_generation_recovers_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "garbage").unwrap();

        record(&store, URL, Some("abc"), at(8, 9));

        let data = store.read().into_data();
        assert_eq!(data.repositories.len(), 1);
        assert_eq!(data.history.len(), 1);
    }

    #[test]
    fn test_last_run_info_none_without_history() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.initialize().unwrap();

        assert!(store.last_run_info(URL).is_none());
    }

    #[test]
    fn test_last_run_info_picks_latest_entry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        record(&store, URL, Some("new"), at(5, 10));
        record(&store, URL, Some("old"), at(1, 10));
        record(&store, "https://github.com/acme/other", Some("x"), at(9, 10));

        let info = store.last_run_info_at(URL, at(7, 9)).unwrap();
        assert_eq!(info.last_date, at(5, 10));
        assert_eq!(info.last_commit_hash.as_deref(), Some("new"));
        // 1 day 23 hours rounds up to 2.
        assert_eq!(info.days, 2);
    }

    #[test]
    fn test_last_run_info_same_instant_is_zero_days() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        record(&store, URL, None, at(5, 10));

        assert_eq!(store.last_run_info_at(URL, at(5, 10)).unwrap().days, 0);
        assert_eq!(
            store
                .last_run_info_at(URL, at(5, 10) + Duration::milliseconds(500))
                .unwrap()
                .days,
            1
        );
        assert_eq!(
            store
                .last_run_info_at(URL, at(5, 10) + Duration::minutes(1))
                .unwrap()
                .days,
            1
        );
    }

    #[test]
    fn test_recent_repositories_sorted_and_limited() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            let url = format!("https://github.com/acme/{}", name);
            record(&store, &url, None, at(i as u32 + 1, 0));
        }

        let recent = store.recent_repositories(2);
        let names: Vec<_> = recent.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn test_history_for_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        record(&store, URL, Some("one"), at(2, 0));
        record(&store, "https://github.com/acme/other", None, at(3, 0));
        record(&store, URL, Some("two"), at(4, 0));

        let entries = store.history_for(URL, DEFAULT_HISTORY_LIMIT);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].last_commit_hash.as_deref(), Some("two"));
        assert_eq!(entries[1].last_commit_hash.as_deref(), Some("one"));

        assert_eq!(store.history_for(URL, 1).len(), 1);
    }

    struct FixedSource {
        commits: Vec<Commit>,
    }

    #[async_trait]
    impl CommitSource for FixedSource {
        async fn commits_since(&self, _repo: &RepoRef, _days: u32) -> Result<Vec<Commit>> {
            Ok(self.commits.clone())
        }

        async fn recent_commits(&self, _repo: &RepoRef) -> Result<Vec<Commit>> {
            Ok(self.commits.clone())
        }
    }

    fn source(hashes: &[&str]) -> FixedSource {
        FixedSource {
            commits: hashes
                .iter()
                .map(|h| Commit::new(*h, "chore: x", "A", at(1, 0)))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_new_commits_unknown_without_prior_hash() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        record(&store, URL, None, at(2, 0));

        let result = new_commits_since_last_changelog(&store, &source(&["aaa"]), URL)
            .await
            .unwrap();
        assert_eq!(result, NewCommits::Unknown);
    }

    #[tokio::test]
    async fn test_new_commits_unknown_with_empty_hash() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        record(&store, URL, Some(""), at(2, 0));

        let result = new_commits_since_last_changelog(&store, &source(&["aaa", "bbb"]), URL)
            .await
            .unwrap();
        assert_eq!(result, NewCommits::Unknown);
    }

    #[tokio::test]
    async fn test_new_commits_counts_by_hash_prefix() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        record(&store, URL, Some("ccc3333"), at(2, 0));

        let source = source(&["aaa1111ffff", "bbb2222ffff", "ccc3333ffff", "ddd4444ffff"]);
        let result = new_commits_since_last_changelog(&store, &source, URL)
            .await
            .unwrap();
        assert_eq!(result, NewCommits::Exact(2));
    }

    #[tokio::test]
    async fn test_new_commits_flags_missing_hash() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        record(&store, URL, Some("zzz"), at(2, 0));

        let result = new_commits_since_last_changelog(&store, &source(&["aaa", "bbb"]), URL)
            .await
            .unwrap();
        assert_eq!(result, NewCommits::AtLeast(2));
        assert!(result.to_string().contains("older than the fetched page"));
    }
}
