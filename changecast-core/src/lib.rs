//! # changecast-core
//!
//! Core library for changecast - turning commit history into changelogs.
//!
//! This crate holds the data model, conventional-commit classification, the
//! Markdown renderer and the local history of past runs. Network clients live
//! in `changecast-sdk`.

pub mod classify;
pub mod config;
pub mod diff;
pub mod error;
pub mod history;
pub mod models;
pub mod render;
pub mod source;

pub use classify::classify;
pub use config::Config;
pub use error::{Error, Result};
pub use history::{HistoryStore, LastRun, NewCommits, StoreRead};
pub use models::{
    Category, ChangelogDocument, ClassifiedCommit, Commit, DateRange, HistoryEntry, Layout,
    RepositoryRecord, StoreData,
};
pub use render::render;
pub use source::{CommitSource, RepoRef};
