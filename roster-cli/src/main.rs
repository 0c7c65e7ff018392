//! Roster: contributor agreement checker.
//!
//! # Usage
//!
//! ```text
//! roster [-t TOKEN] [-e] [-i INPUT] [-o OUTPUT] [-c CONFIG] [REPOS]...
//! ```
//!
//! Exits with status 1 when any contributor has not signed the agreement.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use roster_core::{config, roster_file, RosterConfig};
use roster_forge::GithubClient;
use roster_reconcile::{pipeline, RepoSelection, RunOptions, RunReport};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    version,
    about = "List the contributors of an organization's repositories and check their agreements",
    long_about = None,
)]
struct Cli {
    /// GitHub access token.
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Also scan every commit of every repository (slow, requires a token).
    #[arg(short, long, requires = "token")]
    exhaustive: bool,

    /// Roster file to start from.
    #[arg(short, long, default_value_os_t = roster_file::default_path())]
    input: PathBuf,

    /// Roster file to write.
    #[arg(short, long, default_value_os_t = roster_file::default_path())]
    output: PathBuf,

    /// Configuration file [default: ~/.roster/config.yaml].
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repositories as `name` or `owner/name`; none or `all` for every repository.
    repos: Vec<String>,
}

impl Cli {
    fn run(self) -> Result<RunReport> {
        let config = match self.config.as_deref() {
            Some(path) => config::load_from(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => config::load().context("failed to load config")?,
        };
        let selection = RepoSelection::from_args(&self.repos)?;
        let options = RunOptions {
            exhaustive: self.exhaustive,
            input: self.input,
            output: self.output,
            selection,
        };
        let forge = client(&config, self.token);
        pipeline::run(forge, &config, &options).context("reconciliation failed")
    }
}

fn client(config: &RosterConfig, token: Option<String>) -> GithubClient {
    let token = token.filter(|t| !t.trim().is_empty());
    if token.is_none() {
        tracing::warn!("no token provided, requests are anonymous and heavily rate limited");
    }
    GithubClient::new(config.api_url.clone(), token)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    match cli.run() {
        Ok(outcome) => {
            report::print(&outcome);
            if outcome.has_unsigned() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("{} {err:?}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
