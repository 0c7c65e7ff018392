//! Shared run entrypoint: load, reconcile, save.

use std::path::PathBuf;

use roster_core::{roster_file, RosterConfig, SaveReport};
use roster_forge::Forge;

use crate::engine::Reconciler;
use crate::repos::{self, RepoSelection};
use crate::ReconcileError;

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Also scan every commit of every repository.
    pub exhaustive: bool,
    pub input: PathBuf,
    pub output: PathBuf,
    pub selection: RepoSelection,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            exhaustive: false,
            input: roster_file::default_path(),
            output: roster_file::default_path(),
            selection: RepoSelection::All,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    /// Full names of the repositories that were scanned.
    pub repositories: Vec<String>,
    pub save: SaveReport,
}

impl RunReport {
    pub fn has_unsigned(&self) -> bool {
        self.save.has_unsigned()
    }
}

/// Run a full reconciliation. Nothing is written when any phase fails.
pub fn run<F: Forge>(
    forge: F,
    config: &RosterConfig,
    options: &RunOptions,
) -> Result<RunReport, ReconcileError> {
    let repositories = repos::resolve(&forge, config, &options.selection)?;
    let names: Vec<String> = repositories.iter().map(|r| r.slug().to_owned()).collect();
    tracing::info!(
        repositories = names.len(),
        exhaustive = options.exhaustive,
        "starting reconciliation"
    );

    let store = roster_file::load_at(&options.input, &config.company)?;

    let mut reconciler = Reconciler::new(forge, config.clone(), store, repositories);
    reconciler.fetch_core_team()?;
    reconciler.ingest_contributors()?;
    reconciler.reconcile()?;
    if options.exhaustive {
        reconciler.ingest_commits();
        reconciler.reconcile()?;
    }

    let store = reconciler.into_store();
    let save = roster_file::save_at(&options.output, &store, &config.company)?;
    Ok(RunReport {
        repositories: names,
        save,
    })
}
