//! Repository selection: parsing command-line names and resolving them
//! against the forge.

use std::str::FromStr;

use roster_core::RosterConfig;
use roster_forge::{Forge, Repository};

use crate::error::ReconcileError;

/// `<name>` or `<owner>/<name>`. A bare name belongs to the configured organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: Option<String>,
    pub name: String,
}

impl RepoRef {
    pub fn owner_or<'a>(&'a self, organization: &'a str) -> &'a str {
        self.owner.as_deref().unwrap_or(organization)
    }
}

impl FromStr for RepoRef {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReconcileError::InvalidRepository(s.to_owned());
        let mut parts = s.split('/');
        let (owner, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) => (None, name),
            (Some(owner), Some(name), None) if !owner.is_empty() => (Some(owner.to_owned()), name),
            _ => return Err(invalid()),
        };
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            owner,
            name: name.to_owned(),
        })
    }
}

/// Which repositories a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSelection {
    /// Every repository of the organization, minus private, forked and excluded ones.
    All,
    Named(Vec<RepoRef>),
}

impl RepoSelection {
    /// Each argument may carry several space-separated names. No names, or
    /// the single name `all`, selects every repository.
    pub fn from_args(args: &[String]) -> Result<Self, ReconcileError> {
        let names: Vec<&str> = args.iter().flat_map(|a| a.split_whitespace()).collect();
        match names.as_slice() {
            [] | ["all"] => Ok(Self::All),
            _ => names
                .iter()
                .map(|n| n.parse())
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Named),
        }
    }
}

/// Fetch the selected repositories.
pub fn resolve<F: Forge>(
    forge: &F,
    config: &RosterConfig,
    selection: &RepoSelection,
) -> Result<Vec<Repository>, ReconcileError> {
    match selection {
        RepoSelection::All => {
            let repos = forge.list_org_repositories(&config.organization)?;
            let total = repos.len();
            let kept: Vec<Repository> = repos
                .into_iter()
                .filter(|repo| {
                    let skip = if repo.is_private {
                        Some("private")
                    } else if repo.is_fork {
                        Some("fork")
                    } else if config.is_excluded(&repo.name) {
                        Some("excluded")
                    } else {
                        None
                    };
                    if let Some(reason) = skip {
                        tracing::info!(repository = repo.slug(), reason, "skipping repository");
                    }
                    skip.is_none()
                })
                .collect();
            tracing::info!(
                organization = %config.organization,
                total,
                kept = kept.len(),
                "listed repositories"
            );
            Ok(kept)
        }
        RepoSelection::Named(refs) => refs
            .iter()
            .map(|r| {
                forge
                    .get_repository(r.owner_or(&config.organization), &r.name)
                    .map_err(ReconcileError::from)
            })
            .collect(),
    }
}
