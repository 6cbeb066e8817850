//! # lab
//!
//! **lab** is a minimal GitLab bridge for git checkouts.
//!
//! Features:
//! - `lab projects` lists the projects owned by the authenticated user
//! - `lab create` creates a project on the server (duplicates rejected)
//! - `lab track` wires a hosted project as a remote of the current checkout
//! - `lab clone` clones a hosted project by name
//! - `lab page` prints the web page URL of a project
//! - `lab url` prints the resolved server URL
//!
//! The server URL comes from `gitlab.url` in the git config (checkout first,
//! then the global cascade), or `https://gitlab.com`. The credential comes
//! from `GITLAB_PRIVATE_TOKEN` or `gitlab.token` in the same config.
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::ProgressBar;
use lab::{Client, Session, progress};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "lab",
    version,
    about = "lab - minimal GitLab project bridge for git checkouts",
    arg_required_else_help = true
)]
struct Cli {
    /// Base URL of the GitLab server (overrides the configured one)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Available subcommands.
///
/// Each variant corresponds to a subcommand of `lab`.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// List projects owned by the authenticated user
    Projects,
    /// Create a project on the server
    Create {
        /// Name of the project
        name: String,
        /// Enable the wiki for the project
        #[arg(long)]
        wiki: bool,
        /// Make the project public
        #[arg(long)]
        public: bool,
    },
    /// Add a hosted project as a remote of the current checkout and push
    Track {
        /// Name of the hosted project
        #[arg(default_value = "gitlab")]
        project: String,
        /// Local branch to push upstream
        #[arg(long, default_value = "master")]
        branch: String,
        /// Name of the remote to create
        #[arg(long, default_value = "gitlab")]
        remote: String,
        /// Create the remote without pushing the branch
        #[arg(long)]
        no_push: bool,
    },
    /// Clone a hosted project
    Clone {
        /// Name of the project to clone
        name: String,
        /// Destination path (defaults to the project name)
        path: Option<PathBuf>,
    },
    /// Print the web page URL of a project
    Page {
        /// Project name (defaults to the one tracking the current checkout)
        name: Option<String>,
    },
    /// Print the resolved server URL
    Url,
}

/// CLI entry point.
///
/// Errors surface as a single red line on stderr with exit status 1.
fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Url => {
            let url = cli.url.unwrap_or_else(lab::resolve_server_url);
            println!("{}", url);
            Ok(())
        }
        Cmd::Projects => cmd_projects(&login(cli.url)?),
        Cmd::Create { name, wiki, public } => cmd_create(&login(cli.url)?, &name, wiki, public),
        Cmd::Track {
            project,
            branch,
            remote,
            no_push,
        } => cmd_track(&login(cli.url)?, &project, &branch, &remote, no_push),
        Cmd::Clone { name, path } => cmd_clone(&login(cli.url)?, &name, path),
        Cmd::Page { name } => {
            let session = login(cli.url)?;
            let page = session.project_page(name.as_deref())?;
            println!("{}", page);
            Ok(())
        }
    }
}

/// Resolve the credential and open an authenticated session.
///
/// The token comes from `GITLAB_PRIVATE_TOKEN`, falling back to
/// `gitlab.token` in the git config cascade.
fn login(url: Option<String>) -> Result<Session> {
    let token = lab::resolve_token().context(
        "no GitLab token found; set GITLAB_PRIVATE_TOKEN or run `git config gitlab.token <token>`",
    )?;
    let client = match url {
        Some(u) => Client::new(u),
        None => Client::from_config(),
    };
    Ok(client.login(&token)?)
}

/// Print a human-readable list of owned projects.
fn cmd_projects(session: &Session) -> Result<()> {
    for p in session.projects()? {
        let page = p
            .http_url_to_repo
            .strip_suffix(".git")
            .unwrap_or(&p.http_url_to_repo);
        println!("- {} ({}) {}", p.name, p.visibility, page);
    }
    Ok(())
}

fn cmd_create(session: &Session, name: &str, wiki: bool, public: bool) -> Result<()> {
    let project = session.create_project(name, wiki, public)?;
    println!("created {}", project.name);
    Ok(())
}

fn cmd_track(
    session: &Session,
    project: &str,
    branch: &str,
    remote: &str,
    no_push: bool,
) -> Result<()> {
    let pb = spinner(format!("tracking {} as {}", project, remote));
    match session.track(project, branch, remote, no_push) {
        Ok(r) => {
            pb.set_style(progress::ok_style());
            pb.finish_with_message(format!("tracking {} via remote {}", project, r.name));
            Ok(())
        }
        Err(e) => {
            pb.set_style(progress::err_style());
            pb.finish_with_message(format!("tracking {} failed", project));
            Err(e.into())
        }
    }
}

fn cmd_clone(session: &Session, name: &str, path: Option<PathBuf>) -> Result<()> {
    let pb = spinner(format!("cloning {}", name));
    match session.clone_project(name, path.as_deref()) {
        Ok(()) => {
            pb.set_style(progress::ok_style());
            pb.finish_with_message(format!("cloned {}", name));
            Ok(())
        }
        Err(e) => {
            pb.set_style(progress::err_style());
            pb.finish_with_message(format!("cloning {} failed", name));
            Err(e.into())
        }
    }
}

fn spinner(msg: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(progress::spinner_style());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb.set_message(msg);
    pb
}
