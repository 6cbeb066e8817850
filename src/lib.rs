//! Crate entry point for **lab**.
//!
//! This library provides the internal implementation for the `lab` CLI.
//! Each submodule encapsulates one responsibility (server-URL resolution,
//! git operations, the GitLab REST accessor, project/remote reconciliation).
//! The `pub use` re-exports make the client surface accessible directly from
//! the crate root.
//!
//! This file is primarily intended for developers hacking on `lab`.

mod api;
mod client;
pub mod config;
mod error;
mod git;
pub mod progress;

/// Re-export commonly used types and operations so they can be accessed
/// from `lab::*`.
pub use api::Project;
pub use client::{
    Client, GITLAB_REMOTE, Session, gitlab_remote, project_name, project_name_from_url, remote,
};
pub use config::{DEFAULT_GITLAB_URL, resolve_server_url, resolve_token};
pub use error::{Error, Result};
pub use git::RemoteInfo;
