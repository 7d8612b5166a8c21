//! # changecast
//!
//! Changelogs from GitHub commit history.
//!
//! This umbrella crate re-exports the workspace members: `core` for the
//! classifier, renderer and run history, `sdk` for the network clients and
//! `server` for the local publishing endpoint.

pub use changecast_core as core;
pub use changecast_sdk as sdk;
pub use changecast_server as server;
