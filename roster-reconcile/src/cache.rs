//! Per-repository commit cache.
//!
//! Filled lazily on first access and never invalidated within a run: both
//! evidence mining and the exhaustive commit pass read from it.

use std::collections::HashMap;

use roster_forge::{Commit, Forge, Repository};

#[derive(Debug, Default)]
pub struct CommitCache {
    by_repository: HashMap<u64, Vec<Commit>>,
}

impl CommitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits of `repo`, fetched on first use.
    ///
    /// A listing failure is logged and cached as an empty history.
    pub fn commits<F: Forge>(&mut self, forge: &F, repo: &Repository) -> &[Commit] {
        self.by_repository.entry(repo.id).or_insert_with(|| {
            tracing::debug!(repository = repo.slug(), "listing commits");
            match forge.list_commits(repo) {
                Ok(commits) => commits,
                Err(err) => {
                    tracing::error!(
                        repository = repo.slug(),
                        error = %err,
                        "failed to list commits, treating as empty"
                    );
                    Vec::new()
                }
            }
        })
    }
}
