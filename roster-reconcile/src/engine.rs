//! Identity reconciliation engine.
//!
//! ## Phases
//!
//! 1. [`Reconciler::fetch_core_team`]: load the core team, the authority for
//!    internal staff.
//! 2. [`Reconciler::ingest_contributors`]: contributor lists of every
//!    repository.
//! 3. [`Reconciler::reconcile`]: gap-fill, absorb, infer, mine, merge.
//! 4. [`Reconciler::ingest_commits`]: in exhaustive mode, every commit
//!    author and committer, followed by another `reconcile`.
//!
//! All forge calls are sequential. Commit histories go through a
//! [`CommitCache`] shared by evidence mining and the commit pass.

use std::collections::BTreeMap;

use roster_core::{Company, Developer, DeveloperId, Profile, RosterConfig, RosterStore};
use roster_forge::{Commit, Contributor, Forge, GitIdentity, Repository, User};

use crate::cache::CommitCache;
use crate::error::ReconcileError;

/// Counters from one [`Reconciler::reconcile`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Login records enriched from the core team or a profile lookup.
    pub enriched: usize,
    /// Anonymous records absorbed because their name matched a login record.
    pub absorbed_by_name: usize,
    /// Records that received an email from commit history.
    pub mined: usize,
    /// Anonymous records merged through a shared email or name/login match.
    pub merged: usize,
    /// Anonymous records left without any email.
    pub unresolved: usize,
}

pub struct Reconciler<F> {
    forge: F,
    config: RosterConfig,
    store: RosterStore,
    repositories: Vec<Repository>,
    core_team: BTreeMap<String, Profile>,
    commits: CommitCache,
}

impl<F: Forge> Reconciler<F> {
    pub fn new(
        forge: F,
        config: RosterConfig,
        store: RosterStore,
        repositories: Vec<Repository>,
    ) -> Self {
        Self {
            forge,
            config,
            store,
            repositories,
            core_team: BTreeMap::new(),
            commits: CommitCache::new(),
        }
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn into_store(self) -> RosterStore {
        self.store
    }

    pub fn is_core_member(&self, login: &str) -> bool {
        self.core_team.contains_key(login)
    }

    // -----------------------------------------------------------------------
    // Core team
    // -----------------------------------------------------------------------

    /// Load the core team. Fails if the configured id names another team.
    pub fn fetch_core_team(&mut self) -> Result<usize, ReconcileError> {
        let expected = &self.config.team;
        let team = self.forge.get_team(expected.id)?;
        if !team.name.eq_ignore_ascii_case(&expected.name) {
            return Err(ReconcileError::WrongTeam {
                id: expected.id,
                expected: expected.name.clone(),
                found: team.name,
            });
        }
        for member in self.forge.get_team_members(expected.id)? {
            if let Some(login) = non_blank(member.login.as_deref()) {
                let profile = profile_of(&member, &self.config.company);
                self.core_team.insert(login.to_owned(), profile);
            }
        }
        tracing::info!(team = %team.name, members = self.core_team.len(), "loaded core team");
        Ok(self.core_team.len())
    }

    // -----------------------------------------------------------------------
    // Contributors
    // -----------------------------------------------------------------------

    /// Ingest the contributor list of every repository.
    pub fn ingest_contributors(&mut self) -> Result<(), ReconcileError> {
        for index in 0..self.repositories.len() {
            let repo = self.repositories[index].clone();
            let contributors = self.forge.list_contributors(&repo)?;
            tracing::info!(
                repository = repo.slug(),
                contributors = contributors.len(),
                "ingesting contributors"
            );
            for contributor in &contributors {
                self.ingest_contributor(&repo, contributor);
            }
        }
        Ok(())
    }

    fn ingest_contributor(&mut self, repo: &Repository, contributor: &Contributor) {
        let Some(evidence) = contributor_evidence(contributor) else {
            tracing::warn!(repository = repo.slug(), "skipping contributor without login or name");
            return;
        };
        let (id, tally) = match evidence.login() {
            Some(login) => (self.store.ensure_login(login), !self.is_core_member(login)),
            None => {
                let name = evidence.display_name().unwrap_or_default();
                let id = self.store.ensure_name(name);
                self.store.remember_name(name, id);
                (id, true)
            }
        };
        if let Some(dev) = self.store.get_mut(id) {
            dev.merge_from(&evidence);
            if tally {
                dev.add_evidence(&repo.html_url);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Commits
    // -----------------------------------------------------------------------

    /// Record the author and committer of every commit of every repository.
    pub fn ingest_commits(&mut self) {
        for repo in &self.repositories {
            let commits = self.commits.commits(&self.forge, repo);
            tracing::info!(repository = repo.slug(), commits = commits.len(), "parsing commits");
            for commit in commits {
                for (account, git) in commit.identities() {
                    record_identity(
                        &mut self.store,
                        &self.core_team,
                        &self.config.company,
                        commit,
                        account,
                        git,
                    );
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Run every reconciliation step, in order.
    pub fn reconcile(&mut self) -> Result<ReconcileSummary, ReconcileError> {
        let mut summary = ReconcileSummary {
            enriched: self.fill_login_records()?,
            absorbed_by_name: self.absorb_same_named_orphans(),
            ..ReconcileSummary::default()
        };
        self.infer_companies();
        summary.mined = self.mine_missing_emails();
        let (merged, unresolved) = self.merge_orphans();
        summary.merged = merged;
        summary.unresolved = unresolved;
        self.store.refresh_name_index();
        tracing::info!(?summary, developers = self.store.len(), "reconciled roster");
        Ok(summary)
    }

    /// Step 1: enrich incomplete login records from the core team, then the
    /// forge profile. An unknown login is not an error.
    fn fill_login_records(&mut self) -> Result<usize, ReconcileError> {
        let mut enriched = 0;
        for id in self.store.login_ids() {
            let Some(dev) = self.store.get_mut(id) else {
                continue;
            };
            if dev.is_complete() {
                continue;
            }
            let login = dev.login().unwrap_or_default().to_owned();
            if let Some(profile) = self.core_team.get(&login) {
                dev.fill_from(profile);
                dev.force_company(Company::Internal);
                enriched += 1;
            }
            if dev.is_complete() {
                continue;
            }
            match self.forge.get_user(&login) {
                Ok(user) => {
                    dev.fill_from(&profile_of(&user, &self.config.company));
                    enriched += 1;
                }
                Err(err) if err.is_not_found() => {
                    tracing::debug!(%login, "no profile available");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(enriched)
    }

    /// Step 2: a login record absorbs the anonymous record carrying its name.
    fn absorb_same_named_orphans(&mut self) -> usize {
        let mut absorbed = 0;
        for id in self.store.login_ids() {
            let Some(name) = self.store.get(id).and_then(|d| d.display_name()).map(str::to_owned)
            else {
                continue;
            };
            if let Some(orphan) = self.store.by_name(&name) {
                if self.store.absorb(id, orphan) {
                    absorbed += 1;
                }
            }
        }
        absorbed
    }

    /// Step 3: records without a company but with a staff email are probably staff.
    fn infer_companies(&mut self) {
        let ids: Vec<DeveloperId> = self
            .store
            .login_ids()
            .into_iter()
            .chain(self.store.orphan_ids())
            .collect();
        for id in ids {
            if let Some(dev) = self.store.get_mut(id) {
                infer_company(dev, &self.config);
            }
        }
    }

    /// Step 4: look up an email in commit history for every record without one.
    fn mine_missing_emails(&mut self) -> usize {
        let candidates: Vec<DeveloperId> = self
            .store
            .orphan_ids()
            .into_iter()
            .chain(self.store.login_ids())
            .filter(|id| self.store.get(*id).is_some_and(|d| d.emails().is_empty()))
            .collect();
        let mut mined = 0;
        for id in candidates {
            if self.mine_email(id) {
                mined += 1;
            }
        }
        mined
    }

    /// Scan commit histories for an identity named like `id`. First match wins.
    fn mine_email(&mut self, id: DeveloperId) -> bool {
        let Some(dev) = self.store.get(id) else {
            return false;
        };
        let names: Vec<String> = [dev.display_name(), dev.login()]
            .into_iter()
            .flatten()
            .map(str::to_owned)
            .collect();
        tracing::debug!(developer = %dev, "looking for an email in commits");

        let mut found = None;
        'scan: for repo in &self.repositories {
            for commit in self.commits.commits(&self.forge, repo) {
                let identities = [commit.commit.author.as_ref(), commit.commit.committer.as_ref()];
                for git in identities.into_iter().flatten() {
                    let named = git
                        .name
                        .as_deref()
                        .is_some_and(|n| names.iter().any(|candidate| candidate == n));
                    if let (true, Some(email)) = (named, non_blank(git.email.as_deref())) {
                        found = Some(email.to_owned());
                        break 'scan;
                    }
                }
            }
        }

        let Some(email) = found else {
            return false;
        };
        match self.store.get_mut(id) {
            Some(dev) => {
                dev.add_email(&email);
                infer_company(dev, &self.config);
                true
            }
            None => false,
        }
    }

    /// Step 5: merge anonymous records into the record they denote.
    ///
    /// Login records are tried first (shared email, or name equal to the
    /// login), then anonymous records already kept in this pass (shared email).
    fn merge_orphans(&mut self) -> (usize, usize) {
        let mut merged = 0;
        let mut unresolved = 0;
        let mut kept: Vec<DeveloperId> = Vec::new();
        for orphan_id in self.store.orphan_ids() {
            let Some(orphan) = self.store.get(orphan_id).cloned() else {
                continue;
            };
            if orphan.emails().is_empty() {
                tracing::warn!(developer = %orphan, "couldn't find an email, leaving unresolved");
                unresolved += 1;
                continue;
            }
            let same_person = |id: &DeveloperId| {
                self.store
                    .get(*id)
                    .is_some_and(|dev| dev.denotes_same_person(&orphan))
            };
            let target = self
                .store
                .login_ids()
                .into_iter()
                .find(same_person)
                .or_else(|| kept.iter().copied().find(same_person));
            match target {
                Some(target) if self.store.absorb(target, orphan_id) => {
                    tracing::debug!(developer = %orphan, "merged anonymous record");
                    merged += 1;
                }
                _ => kept.push(orphan_id),
            }
        }
        (merged, unresolved)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Enrichment diff for a forge account.
pub fn profile_of(user: &User, company: &str) -> Profile {
    Profile {
        name: non_blank(user.name.as_deref()).map(str::to_owned),
        email: non_blank(user.email.as_deref()).map(str::to_owned),
        company: user
            .company
            .as_deref()
            .and_then(|raw| Company::classify(raw, company)),
        url: non_blank(user.url.as_deref()).map(str::to_owned),
    }
}

/// The record a contributor entry describes, or `None` without login or name.
fn contributor_evidence(contributor: &Contributor) -> Option<Developer> {
    let name = non_blank(contributor.name.as_deref());
    let mut dev = match (non_blank(contributor.login.as_deref()), name) {
        (Some(login), _) => Developer::with_login(login),
        (None, Some(name)) => Developer::anonymous(name),
        (None, None) => return None,
    };
    if let Some(name) = name {
        dev.set_display_name_if_unset(name);
    }
    if let Some(email) = contributor.email.as_deref() {
        dev.add_email(email);
    }
    if let Some(url) = contributor.url.as_deref() {
        dev.set_url_if_unset(url);
    }
    Some(dev)
}

fn infer_company(dev: &mut Developer, config: &RosterConfig) {
    if dev.company().is_none() && dev.emails().iter().any(|e| config.is_internal_email(e)) {
        dev.set_company_if_unset(Company::Unconfirmed);
    }
}

fn record_identity(
    store: &mut RosterStore,
    core_team: &BTreeMap<String, Profile>,
    company: &str,
    commit: &Commit,
    account: Option<&User>,
    git: Option<&GitIdentity>,
) {
    let linked = account.and_then(|user| non_blank(user.login.as_deref()).map(|l| (user, l)));
    if let Some((user, login)) = linked {
        let id = match store.by_login(login) {
            Some(id) => id,
            None => {
                let id = store.ensure_login(login);
                let profile = profile_of(user, company);
                if let Some(dev) = store.get_mut(id) {
                    dev.fill_from(&profile);
                }
                if let Some(name) = profile.name.as_deref() {
                    store.remember_name(name, id);
                }
                id
            }
        };
        if !core_team.contains_key(login) {
            if let Some(dev) = store.get_mut(id) {
                dev.add_evidence(&commit.url);
            }
        }
        return;
    }

    let Some(git) = git else {
        return;
    };
    let Some(name) = non_blank(git.name.as_deref()) else {
        return;
    };
    let id = match store.find_by_any_name(name) {
        Some(id) => id,
        None => {
            let id = store.ensure_name(name);
            if let (Some(dev), Some(email)) = (store.get_mut(id), git.email.as_deref()) {
                dev.add_email(email);
            }
            store.remember_name(name, id);
            id
        }
    };
    if let Some(dev) = store.get_mut(id) {
        dev.add_evidence(&commit.url);
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
