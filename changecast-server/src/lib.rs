//! # changecast-server
//!
//! Local HTTP endpoint that receives published changelogs.

pub mod api;
pub mod server;

pub use api::{AppState, PublishedChangelog};
pub use server::ChangelogServer;
