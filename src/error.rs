use thiserror::Error;

/// Error kinds surfaced by the library.
///
/// Lookup misses and duplicate names are dedicated variants so that callers
/// (the CLI, scripts embedding the crate) can match on them instead of
/// string-probing messages. Failures inside the collaborators (libgit2,
/// the HTTP client) pass through transparently.
#[derive(Debug, Error)]
pub enum Error {
    /// A project, remote, or config value lookup found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A create operation collided with an existing project or remote name.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The server rejected the credential with a 401.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Login failed for a reason other than a 401 rejection.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A clone URL did not end in `/<name>.git`.
    #[error("malformed project url: {0}")]
    MalformedUrl(String),

    /// An empty or otherwise unusable remote name was given.
    #[error("invalid remote name: {0:?}")]
    InvalidRemoteName(String),

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
