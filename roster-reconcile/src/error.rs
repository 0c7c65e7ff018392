//! Error types for roster-reconcile.

use thiserror::Error;

use roster_core::RosterError;
use roster_forge::ForgeError;

/// Fatal conditions of a reconciliation run. Recoverable ones never surface here.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The configured core team id resolves to a team with another name.
    #[error("team {id} is named '{found}', expected '{expected}'")]
    WrongTeam {
        id: u64,
        expected: String,
        found: String,
    },

    /// A repository argument that is neither `<name>` nor `<owner>/<name>`.
    #[error("invalid repository '{0}'; expected <name> or <owner>/<name>")]
    InvalidRepository(String),

    /// An error from the forge.
    #[error("forge error: {0}")]
    Forge(#[from] ForgeError),

    /// An error from the roster file or config.
    #[error("roster error: {0}")]
    Roster(#[from] RosterError),
}
