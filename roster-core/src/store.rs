//! In-memory roster store.
//!
//! Records live in a single map addressed by a stable [`DeveloperId`]. Two
//! secondary indexes point into it:
//!
//! - `by_login`: every record with a login;
//! - `by_name` : anonymous records, keyed by display name.
//!
//! A new record is added to its index directly; an absorb rebuilds both with
//! [`RosterStore::reindex`]. A record is always reachable through exactly one
//! of them. `all_by_name` is an append-only lookup over every display name ever
//! seen; ids retired by a merge are redirected to their absorber.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::types::Developer;

/// Stable identity of a record within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeveloperId(u64);

#[derive(Debug, Default, Clone)]
pub struct RosterStore {
    next_id: u64,
    records: BTreeMap<DeveloperId, Developer>,
    retired: HashMap<DeveloperId, DeveloperId>,
    by_login: BTreeMap<String, DeveloperId>,
    by_name: BTreeMap<String, DeveloperId>,
    all_by_name: BTreeMap<String, DeveloperId>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // -----------------------------------------------------------------------
    // Structural changes
    // -----------------------------------------------------------------------

    /// Add a record, merging it into the record already holding its key.
    ///
    /// Returns `None` for a record with neither login nor display name.
    pub fn insert(&mut self, dev: Developer) -> Option<DeveloperId> {
        let existing = match (dev.login(), dev.display_name()) {
            (Some(login), _) => self.by_login(login),
            (None, Some(name)) => self.by_name(name),
            (None, None) => return None,
        };
        if let Some(id) = existing {
            if let Some(current) = self.records.get_mut(&id) {
                current.merge_from(&dev);
            }
            return Some(id);
        }
        Some(self.push(dev))
    }

    /// The record for `login`, created empty if absent.
    pub fn ensure_login(&mut self, login: &str) -> DeveloperId {
        match self.by_login(login) {
            Some(id) => id,
            None => self.push(Developer::with_login(login)),
        }
    }

    /// The anonymous record for `name`, created empty if absent.
    pub fn ensure_name(&mut self, name: &str) -> DeveloperId {
        match self.by_name(name) {
            Some(id) => id,
            None => self.push(Developer::anonymous(name)),
        }
    }

    /// Merge `from` into `into`, retire `from`, and alias its key on `into`.
    ///
    /// Returns `false` when either id is unknown or both resolve to the same record.
    pub fn absorb(&mut self, into: DeveloperId, from: DeveloperId) -> bool {
        let into = self.resolve(into);
        let from = self.resolve(from);
        if into == from || !self.records.contains_key(&into) {
            return false;
        }
        let Some(absorbed) = self.records.remove(&from) else {
            return false;
        };
        if let Some(target) = self.records.get_mut(&into) {
            target.merge_from(&absorbed);
            if let Some(key) = absorbed.key().filter(|k| !target.answers_to(k)) {
                target.add_alias(key);
            }
        }
        self.retired.insert(from, into);
        self.reindex();
        true
    }

    /// Rebuild `by_login` and `by_name` from the live records.
    pub fn reindex(&mut self) {
        self.by_login.clear();
        self.by_name.clear();
        for (id, dev) in &self.records {
            match (dev.login(), dev.display_name()) {
                (Some(login), _) => {
                    self.by_login.insert(login.to_owned(), *id);
                }
                (None, Some(name)) => {
                    self.by_name.insert(name.to_owned(), *id);
                }
                (None, None) => {}
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn get(&self, id: DeveloperId) -> Option<&Developer> {
        self.records.get(&self.resolve(id))
    }

    pub fn get_mut(&mut self, id: DeveloperId) -> Option<&mut Developer> {
        let id = self.resolve(id);
        self.records.get_mut(&id)
    }

    pub fn by_login(&self, login: &str) -> Option<DeveloperId> {
        self.by_login.get(login).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<DeveloperId> {
        self.by_name.get(name).copied()
    }

    /// Lookup across every display name ever seen, following merges.
    pub fn find_by_any_name(&self, name: &str) -> Option<DeveloperId> {
        let id = self.resolve(*self.all_by_name.get(name)?);
        self.records.contains_key(&id).then_some(id)
    }

    /// Logins in key order.
    pub fn login_ids(&self) -> Vec<DeveloperId> {
        self.by_login.values().copied().collect()
    }

    /// Anonymous records in display-name order.
    pub fn orphan_ids(&self) -> Vec<DeveloperId> {
        self.by_name.values().copied().collect()
    }

    /// Deduplicated, deterministically ordered view of every live record.
    pub fn roster(&self) -> BTreeSet<&Developer> {
        self.records.values().collect()
    }

    // -----------------------------------------------------------------------
    // Display-name superset
    // -----------------------------------------------------------------------

    /// Remember `name` as denoting `id` for commit-stream lookups.
    pub fn remember_name(&mut self, name: &str, id: DeveloperId) {
        if !name.trim().is_empty() {
            self.all_by_name.insert(name.to_owned(), id);
        }
    }

    /// Append every live record's display name to the superset.
    ///
    /// On a name collision the record with a login wins.
    pub fn refresh_name_index(&mut self) {
        let mut entries: Vec<(bool, String, DeveloperId)> = self
            .records
            .iter()
            .filter_map(|(id, dev)| {
                dev.display_name()
                    .map(|n| (!dev.is_anonymous(), n.to_owned(), *id))
            })
            .collect();
        entries.sort();
        for (_, name, id) in entries {
            self.remember_name(&name, id);
        }
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn allocate(&mut self) -> DeveloperId {
        let id = DeveloperId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Only called for a key no live record holds, so the indexes are
    /// extended in place instead of rebuilt.
    fn push(&mut self, dev: Developer) -> DeveloperId {
        let id = self.allocate();
        match (dev.login(), dev.display_name()) {
            (Some(login), _) => {
                self.by_login.insert(login.to_owned(), id);
            }
            (None, Some(name)) => {
                self.by_name.insert(name.to_owned(), id);
            }
            (None, None) => {}
        }
        self.records.insert(id, dev);
        id
    }

    fn resolve(&self, mut id: DeveloperId) -> DeveloperId {
        while let Some(next) = self.retired.get(&id) {
            id = *next;
        }
        id
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
