//! Git integration layer.
//!
//! This module wraps the actual backend implementation (`git2_backend`)
//! and re-exports only the stable public API used by the reconciler:
//! opening the current checkout, remote lookup/creation, pushing a branch
//! upstream, and cloning.
//!
//! Backend details (currently the `git2` crate) stay private so another
//! backend could be swapped in without touching the reconciler.

mod git2_backend;

pub use git2_backend::{
    RemoteInfo, clone_repo, create_remote, find_remote, open_current, push_branch,
};
