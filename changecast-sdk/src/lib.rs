//! # changecast-sdk
//!
//! Network clients used by changecast.
//!
//! ## Example
//!
//! ```no_run
//! use changecast_core::{classify, render, DateRange, Layout, RepoRef};
//! use changecast_sdk::GitHubClient;
//!
//! # async fn run() -> changecast_core::Result<()> {
//! let github = GitHubClient::new(None)?;
//! let repo = RepoRef::parse("https://github.com/tokio-rs/axum")?;
//!
//! let commits = github.fetch_commits(&repo, 7).await?;
//! let doc = render(&repo.name, &classify(&commits), &DateRange::last_days(7)?, Layout::External);
//! println!("{}", doc.content);
//! # Ok(())
//! # }
//! ```

pub mod github;
pub mod publish;
pub mod summarizer;

pub use github::GitHubClient;
pub use publish::{PublishClient, PublishReceipt};
pub use summarizer::{Summarizer, Summary, Unavailable};
