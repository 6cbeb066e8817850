use git2::{
    BranchType, Cred, FetchOptions, PushOptions, RemoteCallbacks, Repository, build::RepoBuilder,
};
use std::path::Path;

use crate::error::{Error, Result};

/// A named remote of a local checkout, as stored in its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

/// Build `RemoteCallbacks` with SSH-agent credentials enabled.
///
/// This allows push/clone operations to authenticate using the user's SSH
/// agent. If no SSH key is found, it falls back to default credentials.
fn callbacks_with_creds() -> RemoteCallbacks<'static> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, _allowed| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git")).or_else(|_| Cred::default())
    });
    cb
}

/// Open the checkout containing the current working directory.
///
/// # Errors
/// Returns [`Error::NotFound`] if the current directory is not inside a
/// git checkout.
pub fn open_current() -> Result<Repository> {
    Repository::discover(".")
        .map_err(|_| Error::NotFound("no git checkout in the current directory".into()))
}

/// Return the remote with the given name, scanning the checkout's
/// configured remotes for an exact match.
///
/// # Errors
/// Returns [`Error::NotFound`] if the checkout has no remotes or none
/// matches `name`.
pub fn find_remote(repo: &Repository, name: &str) -> Result<RemoteInfo> {
    let names = repo.remotes()?;
    for candidate in names.iter().flatten() {
        if candidate == name {
            let remote = repo.find_remote(candidate)?;
            return Ok(RemoteInfo {
                name: candidate.to_string(),
                url: remote.url().unwrap_or_default().to_string(),
            });
        }
    }
    Err(Error::NotFound(format!("remote {}", name)))
}

/// Create a new remote named `name` pointing at `url`.
///
/// The name is validated first: it must be non-empty and must not collide
/// with an existing remote (lookup-first, so an existing remote is never
/// overwritten).
///
/// # Errors
/// - [`Error::InvalidRemoteName`] for an empty name.
/// - [`Error::AlreadyExists`] if a remote with that name is configured.
pub fn create_remote(repo: &Repository, name: &str, url: &str) -> Result<RemoteInfo> {
    if name.is_empty() {
        return Err(Error::InvalidRemoteName(name.to_string()));
    }
    if find_remote(repo, name).is_ok() {
        return Err(Error::AlreadyExists(format!("remote {}", name)));
    }
    let remote = repo.remote(name, url)?;
    Ok(RemoteInfo {
        name: name.to_string(),
        url: remote.url().unwrap_or_default().to_string(),
    })
}

/// Push a local branch to the named remote and set it as the branch's
/// upstream.
///
/// Pushes `refs/heads/<branch>` with SSH-agent credentials; after a
/// successful push the remote-tracking ref exists, so the upstream is set
/// to `<remote>/<branch>`.
///
/// # Errors
/// Returns an error if the remote or local branch does not exist, or if
/// the push itself fails.
pub fn push_branch(repo: &Repository, remote_name: &str, branch: &str) -> Result<()> {
    let mut remote = repo.find_remote(remote_name)?;
    let mut po = PushOptions::new();
    po.remote_callbacks(callbacks_with_creds());
    let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
    remote.push(&[refspec.as_str()], Some(&mut po))?;

    let mut local = repo.find_branch(branch, BranchType::Local)?;
    local.set_upstream(Some(&format!("{}/{}", remote_name, branch)))?;
    Ok(())
}

/// Clone the repository at `url` into `dest`.
///
/// # Errors
/// Collaborator errors (unreachable URL, unsuitable destination path)
/// propagate unchanged.
pub fn clone_repo(url: &str, dest: &Path) -> Result<()> {
    let mut fo = FetchOptions::new();
    fo.remote_callbacks(callbacks_with_creds());
    let mut builder = RepoBuilder::new();
    builder.fetch_options(fo);
    builder.clone(url, dest)?;
    Ok(())
}
