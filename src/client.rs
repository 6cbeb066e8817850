//! GitLab client and project/remote reconciliation.
//!
//! [`Client`] is an unauthenticated handle bound to a server URL. Logging in
//! consumes it and yields a [`Session`], so every operation that needs the
//! authenticated API lives on `Session` and cannot be called before login.
//! Operations that only touch the local checkout (remote lookup, name
//! extraction) are free functions.

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::api::{Api, Project};
use crate::config;
use crate::error::{Error, Result};
use crate::git::{self, RemoteInfo};

/// Remote name conventionally used for the tracked GitLab project.
pub const GITLAB_REMOTE: &str = "gitlab";

/// An unauthenticated handle bound to a GitLab server URL.
pub struct Client {
    url: String,
}

impl Client {
    /// Bind a handle to an explicit server base URL.
    pub fn new(url: impl Into<String>) -> Client {
        Client { url: url.into() }
    }

    /// Bind a handle to the configured server URL (checkout config, global
    /// config cascade, or the default — see [`config::resolve_server_url`]).
    pub fn from_config() -> Client {
        Client {
            url: config::resolve_server_url(),
        }
    }

    /// Base URL of the GitLab server this handle is bound to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Log in with a private token, consuming the handle.
    ///
    /// # Errors
    /// - [`Error::Unauthorized`] if the server rejects the token with a 401.
    /// - [`Error::Authentication`] for any other login failure.
    pub fn login(self, token: &str) -> Result<Session> {
        let api = Api::connect(&self.url, token)?;
        Ok(Session {
            api,
            url: self.url,
        })
    }
}

/// An authenticated session against a GitLab server.
#[derive(Debug)]
pub struct Session {
    api: Api,
    url: String,
}

impl Session {
    /// Base URL of the GitLab server this session talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the projects owned by the authenticated user.
    pub fn projects(&self) -> Result<Vec<Project>> {
        self.api.owned_projects()
    }

    /// Return the project with the given name.
    ///
    /// When `name` is `None`, it is derived from the URL of the checkout's
    /// `gitlab` remote. Matching is a linear scan with exact, case-sensitive
    /// name equality; the first match wins.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no owned project has that name.
    pub fn project(&self, name: Option<&str>) -> Result<Project> {
        let name = match name {
            Some(n) => n.to_string(),
            None => project_name()?,
        };
        self.projects()?
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::NotFound(format!("project {}", name)))
    }

    /// Create a project on the server.
    ///
    /// Lookup-first: if a project with that name already exists, nothing is
    /// sent to the server and [`Error::AlreadyExists`] is returned, so an
    /// existing project is never silently duplicated.
    pub fn create_project(&self, name: &str, wiki_enabled: bool, public: bool) -> Result<Project> {
        match self.project(Some(name)) {
            Ok(_) => Err(Error::AlreadyExists(format!("project {}", name))),
            Err(Error::NotFound(_)) => self.api.create_project(name, wiki_enabled, public),
            Err(e) => Err(e),
        }
    }

    /// Set a hosted project as a remote of the current checkout.
    ///
    /// Resolves the project by name, creates a local remote named
    /// `remote_name` pointing at the project's SSH clone URL, and pushes
    /// `branch` to it as the upstream tracking branch. With `no_push` the
    /// remote is created but nothing is pushed.
    ///
    /// # Errors
    /// - [`Error::NotFound`] if the project does not exist.
    /// - [`Error::InvalidRemoteName`] for an empty remote name.
    /// - [`Error::AlreadyExists`] if the checkout already has a remote with
    ///   that name; the existing remote is left untouched.
    pub fn track(
        &self,
        project_name: &str,
        branch: &str,
        remote_name: &str,
        no_push: bool,
    ) -> Result<RemoteInfo> {
        let project = self.project(Some(project_name))?;
        let repo = git::open_current()?;
        let remote = git::create_remote(&repo, remote_name, &project.ssh_url_to_repo)?;
        if !no_push {
            git::push_branch(&repo, remote_name, branch)?;
        }
        Ok(remote)
    }

    /// Clone a hosted project's SSH URL to `path` (defaulting to the
    /// project name in the current directory).
    pub fn clone_project(&self, name: &str, path: Option<&Path>) -> Result<()> {
        let project = self.project(Some(name))?;
        let dest = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(name));
        git::clone_repo(&project.ssh_url_to_repo, &dest)
    }

    /// Return the web page URL of a project: its HTTP clone URL with a
    /// trailing `.git` stripped. No other normalization is applied.
    pub fn project_page(&self, name: Option<&str>) -> Result<String> {
        let project = self.project(name)?;
        let url = project.http_url_to_repo;
        Ok(match url.strip_suffix(".git") {
            Some(stripped) => stripped.to_string(),
            None => url,
        })
    }
}

/// Return the named remote of the checkout in the current directory.
pub fn remote(name: &str) -> Result<RemoteInfo> {
    let repo = git::open_current()?;
    git::find_remote(&repo, name)
}

/// Return the `gitlab` remote of the checkout in the current directory.
pub fn gitlab_remote() -> Result<RemoteInfo> {
    remote(GITLAB_REMOTE)
}

/// Return the name of the project tracking the checkout in the current
/// directory, derived from the `gitlab` remote's URL.
pub fn project_name() -> Result<String> {
    let remote = gitlab_remote()?;
    project_name_from_url(&remote.url)
}

/// Extract the project name from a clone URL of the form `.../<name>.git`.
///
/// Only the final path segment before `.git` is captured, so
/// `https://host/a/b/foo.git` yields `foo`.
///
/// # Errors
/// Returns [`Error::MalformedUrl`] if the URL does not match that shape.
pub fn project_name_from_url(url: &str) -> Result<String> {
    let re = Regex::new(r"/([^/\s]+)\.git$").unwrap();
    re.captures(url)
        .map(|c| c[1].to_string())
        .ok_or_else(|| Error::MalformedUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, RepositoryInitOptions};
    use httpmock::prelude::*;
    use serde_json::json;
    use serial_test::serial;
    use std::path::Path;

    #[test]
    fn project_name_from_simple_url() {
        let got = project_name_from_url("https://gitlab.com/foo.git").unwrap();
        assert_eq!(got, "foo");
    }

    #[test]
    fn project_name_takes_final_segment_only() {
        let got = project_name_from_url("https://gitlab.com/a/b/foo.git").unwrap();
        assert_eq!(got, "foo");
    }

    #[test]
    fn project_name_from_ssh_url() {
        let got = project_name_from_url("git@gitlab.com:group/foo.git").unwrap();
        assert_eq!(got, "foo");
    }

    #[test]
    fn project_name_rejects_url_without_git_suffix() {
        let err = project_name_from_url("https://gitlab.com/a/foo").unwrap_err();
        assert!(matches!(err, Error::MalformedUrl(_)));
    }

    fn mock_login(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/v4/user");
            then.status(200).json_body(json!({"username": "dev"}));
        });
    }

    fn mock_projects(server: &MockServer, projects: serde_json::Value) {
        server.mock(|when, then| {
            when.method(GET).path("/api/v4/projects");
            then.status(200).json_body(projects);
        });
    }

    fn session(server: &MockServer) -> Session {
        mock_login(server);
        Client::new(server.base_url()).login("tok").unwrap()
    }

    fn project_json(name: &str, ssh_url: &str) -> serde_json::Value {
        json!({
            "name": name,
            "ssh_url_to_repo": ssh_url,
            "http_url_to_repo": format!("https://example.com/dev/{}.git", name),
        })
    }

    /// Init a repository with `master` as the initial branch and one commit.
    fn init_with_commit(path: &Path) -> Repository {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("master");
        let repo = Repository::init_opts(path, &opts).unwrap();
        {
            let mut cfg = repo.config().unwrap();
            cfg.set_str("user.name", "tester").unwrap();
            cfg.set_str("user.email", "tester@example.com").unwrap();
        }
        {
            let sig = repo.signature().unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn login_rejects_bad_credential_with_unauthorized() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v4/user");
            then.status(401).json_body(json!({"message": "401 Unauthorized"}));
        });
        let err = Client::new(server.base_url()).login("bad").unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[test]
    fn project_lookup_is_exact_and_case_sensitive() {
        let server = MockServer::start();
        mock_projects(
            &server,
            json!([
                project_json("Tools", "git@example.com:dev/Tools.git"),
                project_json("tools", "git@example.com:dev/tools.git"),
            ]),
        );
        let session = session(&server);

        let hit = session.project(Some("tools")).unwrap();
        assert_eq!(hit.ssh_url_to_repo, "git@example.com:dev/tools.git");

        let err = session.project(Some("TOOLS")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn create_project_rejects_duplicate_without_posting() {
        let server = MockServer::start();
        mock_projects(
            &server,
            json!([project_json("dup", "git@example.com:dev/dup.git")]),
        );
        let session = session(&server);

        // No POST mock is registered: if create_project tried to create the
        // project anyway, the call would fail with an HTTP error instead.
        let err = session.create_project("dup", false, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn create_project_creates_when_name_is_free() {
        let server = MockServer::start();
        mock_projects(&server, json!([]));
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/v4/projects");
            then.status(201)
                .json_body(project_json("fresh", "git@example.com:dev/fresh.git"));
        });
        let session = session(&server);

        let project = session.create_project("fresh", false, false).unwrap();
        create.assert();
        assert_eq!(project.name, "fresh");
    }

    #[test]
    fn project_page_strips_git_suffix() {
        let server = MockServer::start();
        mock_projects(
            &server,
            json!([project_json("proj", "git@example.com:group/proj.git")]),
        );
        let session = session(&server);

        let page = session.project_page(Some("proj")).unwrap();
        assert_eq!(page, "https://example.com/dev/proj");
    }

    #[test]
    #[serial]
    fn gitlab_remote_misses_on_checkout_without_one() {
        let td = tempfile::tempdir().unwrap();
        let repo = Repository::init(td.path()).unwrap();
        repo.remote("origin", "https://example.com/a.git").unwrap();
        std::env::set_current_dir(td.path()).unwrap();

        let err = gitlab_remote().unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    #[serial]
    fn track_creates_remote_and_pushes_branch_upstream() {
        let td = tempfile::tempdir().unwrap();
        let work = td.path().join("work");
        let bare = td.path().join("bare.git");
        let repo = init_with_commit(&work);
        Repository::init_bare(&bare).unwrap();

        let server = MockServer::start();
        mock_projects(
            &server,
            json!([project_json("server-tools", bare.to_str().unwrap())]),
        );
        let session = session(&server);

        std::env::set_current_dir(&work).unwrap();
        let remote = session
            .track("server-tools", "master", "gitlab", false)
            .unwrap();
        assert_eq!(remote.name, "gitlab");
        assert_eq!(remote.url, bare.to_str().unwrap());

        let target = Repository::open_bare(&bare).unwrap();
        assert!(target.find_reference("refs/heads/master").is_ok());
        let cfg = repo.config().unwrap().snapshot().unwrap();
        assert_eq!(cfg.get_string("branch.master.remote").unwrap(), "gitlab");

        // Same remote name again: rejected, first remote untouched.
        let err = session
            .track("server-tools", "master", "gitlab", false)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        let kept = remote_of(&repo, "gitlab");
        assert_eq!(kept, bare.to_str().unwrap());
    }

    #[test]
    #[serial]
    fn track_with_no_push_creates_remote_but_does_not_push() {
        let td = tempfile::tempdir().unwrap();
        let work = td.path().join("work");
        let bare = td.path().join("bare.git");
        init_with_commit(&work);
        Repository::init_bare(&bare).unwrap();

        let server = MockServer::start();
        mock_projects(
            &server,
            json!([project_json("server-tools", bare.to_str().unwrap())]),
        );
        let session = session(&server);

        std::env::set_current_dir(&work).unwrap();
        session
            .track("server-tools", "master", "gitlab", true)
            .unwrap();

        let target = Repository::open_bare(&bare).unwrap();
        assert!(target.find_reference("refs/heads/master").is_err());
    }

    #[test]
    #[serial]
    fn track_rejects_empty_remote_name() {
        let td = tempfile::tempdir().unwrap();
        let work = td.path().join("work");
        init_with_commit(&work);

        let server = MockServer::start();
        mock_projects(
            &server,
            json!([project_json("server-tools", "git@example.com:dev/server-tools.git")]),
        );
        let session = session(&server);

        std::env::set_current_dir(&work).unwrap();
        let err = session
            .track("server-tools", "master", "", false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRemoteName(_)));
    }

    #[test]
    #[serial]
    fn clone_project_defaults_path_to_project_name() {
        let td = tempfile::tempdir().unwrap();
        let src = td.path().join("src");
        init_with_commit(&src);

        let server = MockServer::start();
        mock_projects(
            &server,
            json!([project_json("cloned", src.to_str().unwrap())]),
        );
        let session = session(&server);

        let scratch = td.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        std::env::set_current_dir(&scratch).unwrap();

        session.clone_project("cloned", None).unwrap();
        assert!(Repository::open(scratch.join("cloned")).is_ok());

        let explicit = scratch.join("elsewhere");
        session
            .clone_project("cloned", Some(explicit.as_path()))
            .unwrap();
        assert!(Repository::open(&explicit).is_ok());
    }

    fn remote_of(repo: &Repository, name: &str) -> String {
        repo.find_remote(name)
            .unwrap()
            .url()
            .unwrap_or_default()
            .to_string()
    }
}
