use git2::Repository;
use std::env;
use std::path::{Path, PathBuf};

/// Endpoint used when no config source defines `gitlab.url`.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// Git config key holding the server base URL.
const URL_KEY: &str = "gitlab.url";

/// Git config key holding the private token (CLI fallback when
/// `GITLAB_PRIVATE_TOKEN` is unset).
const TOKEN_KEY: &str = "gitlab.token";

/// Environment variable consulted first for the credential.
pub const TOKEN_ENV: &str = "GITLAB_PRIVATE_TOKEN";

/// Return the global git config files to cascade through, in precedence
/// order (first hit wins): system-wide, XDG config home, home directory.
///
/// `XDG_CONFIG_HOME` defaults to `~/.config` when unset, matching git's own
/// lookup rules.
fn global_config_files() -> Vec<PathBuf> {
    let home = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    let xdg = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(".config"));
    vec![
        PathBuf::from("/etc/gitconfig"),
        xdg.join("git").join("config"),
        home.join(".gitconfig"),
    ]
}

/// Read a key from a single git config file.
///
/// An unreadable file or a missing key is simply `None`; the cascade moves
/// on to the next source.
fn value_from_file(file: &Path, key: &str) -> Option<String> {
    let cfg = git2::Config::open(file).ok()?;
    cfg.get_string(key).ok()
}

/// Read a key from the checkout containing `dir`, if there is one.
///
/// Uses the checkout's effective configuration, so a value set with
/// `git config gitlab.url ...` inside the checkout takes precedence over
/// anything the global cascade would find.
fn value_from_checkout(dir: &Path, key: &str) -> Option<String> {
    let repo = Repository::discover(dir).ok()?;
    let cfg = repo.config().ok()?.snapshot().ok()?;
    cfg.get_string(key).ok()
}

/// Resolve a config key at `dir` against an explicit global cascade.
fn value_in(dir: &Path, globals: &[PathBuf], key: &str) -> Option<String> {
    if let Some(v) = value_from_checkout(dir, key) {
        return Some(v);
    }
    globals.iter().find_map(|f| value_from_file(f, key))
}

/// Return the URL of the GitLab server to use. Never fails.
///
/// Sources, in order:
/// 1. `gitlab.url` in the current directory's checkout config, if inside one.
/// 2. `gitlab.url` in `/etc/gitconfig`, `$XDG_CONFIG_HOME/git/config`,
///    `~/.gitconfig` — first file that defines it wins.
/// 3. [`DEFAULT_GITLAB_URL`].
pub fn resolve_server_url() -> String {
    resolve_url_in(Path::new("."), &global_config_files())
}

fn resolve_url_in(dir: &Path, globals: &[PathBuf]) -> String {
    value_in(dir, globals, URL_KEY).unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string())
}

/// Return the private token, if any: `GITLAB_PRIVATE_TOKEN` from the
/// environment, else `gitlab.token` from the same config cascade as the URL.
pub fn resolve_token() -> Option<String> {
    if let Ok(tok) = env::var(TOKEN_ENV)
        && !tok.is_empty()
    {
        return Some(tok);
    }
    value_in(Path::new("."), &global_config_files(), TOKEN_KEY)
}
