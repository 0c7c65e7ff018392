//! Tab-separated roster file.
//!
//! # Format
//!
//! ```text
//! Login  Name  Signed  Emails  Company  URL  Aliases  Commits  Trivial commits
//! ```
//!
//! One row per developer. Multi-valued cells (`Emails`, `Aliases`, `Commits`)
//! hold one value per line, joined with the platform line separator; the codec
//! quotes such cells. `Trivial commits` is kept for compatibility and written
//! empty.
//!
//! Commit evidence is compacted on save: an entry under the same
//! `.../commit` path as the previous full entry is written as its last segment
//! only. Load expands it back.
//!
//! Saving follows the registry pattern: write `<file>.tmp`, then rename.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};

use crate::error::{csv_err, io_err, RosterError};
use crate::store::RosterStore;
use crate::types::{Company, Developer};

/// Exact header expected on load and written on save.
pub const HEADER: [&str; 9] = [
    "Login",
    "Name",
    "Signed",
    "Emails",
    "Company",
    "URL",
    "Aliases",
    "Commits",
    "Trivial commits",
];

#[cfg(windows)]
const CELL_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const CELL_SEPARATOR: &str = "\n";

/// `<tmp>/contributors.csv`, shared by default between input and output.
pub fn default_path() -> PathBuf {
    std::env::temp_dir().join("contributors.csv")
}

/// Outcome of [`save_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    pub written: usize,
    /// Records that are not staff, not a duplicate entry, and have not signed.
    pub unsigned: Vec<Developer>,
}

impl SaveReport {
    pub fn has_unsigned(&self) -> bool {
        !self.unsigned.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load a roster file into a fresh store.
///
/// A missing file or a header mismatch yields an empty store; the latter is
/// logged. Cells that are not valid UTF-8 are read as Latin-1. `company` is
/// the organization's company name used to classify the `Company` column.
pub fn load_at(path: &Path, company: &str) -> Result<RosterStore, RosterError> {
    let mut store = RosterStore::new();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no roster file, starting empty");
        return Ok(store);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_err(path, e))?;
    let mut rows = reader.byte_records();

    let header = match rows.next() {
        Some(row) => decode_row(&row.map_err(|e| csv_err(path, e))?),
        None => return Ok(store),
    };
    if !header.iter().map(String::as_str).eq(HEADER.iter().copied()) {
        tracing::warn!(
            path = %path.display(),
            ?header,
            "roster header mismatch, ignoring file"
        );
        return Ok(store);
    }

    for (index, row) in rows.enumerate() {
        let row = decode_row(&row.map_err(|e| csv_err(path, e))?);
        match parse_row(&row, company) {
            Some(dev) => {
                store.insert(dev);
            }
            None => tracing::warn!(row = index + 1, "skipping roster row without login or name"),
        }
    }
    resolve_aliases(&mut store);
    tracing::info!(path = %path.display(), developers = store.len(), "loaded roster");
    Ok(store)
}

/// Files written with a platform-default encoding may not be UTF-8.
fn decode_row(row: &ByteRecord) -> Vec<String> {
    row.iter()
        .map(|cell| match std::str::from_utf8(cell) {
            Ok(text) => text.to_owned(),
            Err(_) => cell.iter().map(|&b| char::from(b)).collect(),
        })
        .collect()
}

fn parse_row(row: &[String], company: &str) -> Option<Developer> {
    let cell = |i: usize| row.get(i).map(|c| c.trim()).unwrap_or("");

    let mut dev = match (cell(0), cell(1)) {
        ("", "") => return None,
        ("", name) => Developer::anonymous(name),
        (login, name) => {
            let mut dev = Developer::with_login(login);
            dev.set_display_name_if_unset(name);
            dev
        }
    };
    dev.mark_signed(cell(2).eq_ignore_ascii_case("true"));
    for email in split_cell(cell(3)) {
        dev.add_email(email);
    }
    if let Some(company) = Company::classify(cell(4), company) {
        dev.set_company_if_unset(company);
    }
    dev.set_url_if_unset(cell(5));
    for alias in split_cell(cell(6)) {
        dev.add_alias(alias);
    }
    for evidence in expand_evidence(cell(7)) {
        dev.add_evidence(&evidence);
    }
    Some(dev)
}

/// Every alias naming a login record makes the alias owner absorb that record.
fn resolve_aliases(store: &mut RosterStore) {
    let mut owners = store.login_ids();
    owners.extend(store.orphan_ids());
    for owner in owners {
        let Some(aliases) = store.get(owner).map(|d| d.aliases().clone()) else {
            continue;
        };
        for alias in aliases {
            let Some(target) = store.by_login(&alias).filter(|t| *t != owner) else {
                tracing::debug!(%alias, "alias does not name a known login");
                continue;
            };
            let Some(aliased) = store.get(target).cloned() else {
                continue;
            };
            if let Some(dev) = store.get_mut(owner) {
                dev.merge_from(&aliased);
            }
        }
    }
}

fn split_cell(cell: &str) -> impl Iterator<Item = &str> {
    cell.lines().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically write every live record of `store` to `path`.
///
/// Write flow: rows → `<file>.tmp` sibling → `rename`.
pub fn save_at(path: &Path, store: &RosterStore, company: &str) -> Result<SaveReport, RosterError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contributors.csv".to_string());
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    let roster = store.roster();
    let mut unsigned = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&tmp)
            .map_err(|e| csv_err(&tmp, e))?;
        writer.write_record(HEADER).map_err(|e| csv_err(&tmp, e))?;
        for dev in &roster {
            if is_unsigned(dev, store) {
                unsigned.push((*dev).clone());
            }
            tracing::debug!(developer = %dev, "saving");
            writer
                .write_record(render_row(dev, company))
                .map_err(|e| csv_err(&tmp, e))?;
        }
        writer.flush().map_err(|e| io_err(&tmp, e))?;
    }

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }

    tracing::info!(path = %path.display(), developers = roster.len(), "saved roster");
    Ok(SaveReport {
        path: path.to_path_buf(),
        written: roster.len(),
        unsigned,
    })
}

/// Not staff, not signed, and not a duplicate entry of another record.
fn is_unsigned(dev: &Developer, store: &RosterStore) -> bool {
    !is_duplicate(dev, store) && !dev.company().is_some_and(Company::is_internal) && !dev.is_signed()
}

/// An alias naming another live record marks this row as a duplicate of it.
fn is_duplicate(dev: &Developer, store: &RosterStore) -> bool {
    dev.aliases()
        .iter()
        .filter(|alias| !dev.answers_to(alias))
        .any(|alias| store.by_login(alias).is_some() || store.by_name(alias).is_some())
}

fn render_row(dev: &Developer, company: &str) -> [String; 9] {
    let evidence = if dev.company().is_some_and(Company::omits_evidence) {
        String::new()
    } else {
        compact_evidence(dev.commits())
    };
    [
        dev.login().unwrap_or_default().to_owned(),
        dev.display_name().unwrap_or_default().to_owned(),
        dev.is_signed().to_string(),
        join_cell(dev.emails()),
        dev.company().map(|c| c.render(company)).unwrap_or_default(),
        dev.url().unwrap_or_default().to_owned(),
        join_cell(dev.aliases()),
        evidence,
        String::new(),
    ]
}

fn join_cell(values: &BTreeSet<String>) -> String {
    values
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(CELL_SEPARATOR)
}

// ---------------------------------------------------------------------------
// Evidence compaction
// ---------------------------------------------------------------------------

/// Abbreviate consecutive commit URLs sharing a `.../commit` parent.
pub fn compact_evidence(evidence: &BTreeSet<String>) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(evidence.len());
    let mut base: Option<&str> = None;
    for entry in evidence {
        let suffix = base
            .filter(|b| b.ends_with("commit"))
            .and_then(|b| entry.strip_prefix(b))
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|s| !s.is_empty() && !s.contains('/'));
        match suffix {
            Some(suffix) => lines.push(suffix),
            None => {
                lines.push(entry);
                base = entry.rfind('/').map(|i| &entry[..i]);
            }
        }
    }
    lines.join(CELL_SEPARATOR)
}

/// Inverse of [`compact_evidence`].
pub fn expand_evidence(cell: &str) -> Vec<String> {
    let mut expanded = Vec::new();
    let mut base: Option<String> = None;
    for line in split_cell(cell) {
        if line.contains('/') {
            base = line.rfind('/').map(|i| line[..i].to_owned());
            expanded.push(line.to_owned());
        } else if let Some(b) = base.as_deref().filter(|b| b.ends_with("commit")) {
            expanded.push(format!("{b}/{line}"));
        } else {
            expanded.push(line.to_owned());
        }
    }
    expanded
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
