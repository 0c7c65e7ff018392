//! Organization settings.
//!
//! # Storage layout
//!
//! ```text
//! ~/.roster/
//!   config.yaml   (optional: every key has a default)
//! ```
//!
//! Mirrors the registry API pattern: `load_at(home)` takes an explicit home
//! (tests pass a `TempDir`), `load()` derives it from `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, RosterError};

/// Core-team settings used to recognise internal staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Numeric team id on the forge.
    pub id: u64,
    /// Expected team name; a mismatch aborts the run.
    pub name: String,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            id: 35421,
            name: "Developers".to_string(),
        }
    }
}

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Organization login on the forge; bare repository names belong to it.
    pub organization: String,
    /// Company name identifying confirmed staff.
    pub company: String,
    /// Email domain of staff addresses (without `@`).
    pub email_domain: String,
    pub team: TeamConfig,
    /// Repository names skipped when analyzing the whole organization.
    pub excludes: Vec<String>,
    /// Base URL of the forge REST API.
    pub api_url: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            organization: "nuxeo".to_string(),
            company: "Nuxeo".to_string(),
            email_domain: "nuxeo.com".to_string(),
            team: TeamConfig::default(),
            excludes: ["jboss-seam", "jodconverter.bak", "richfaces", "daisydiff", "h2database"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

impl RosterConfig {
    /// `true` if `email` belongs to the staff email domain.
    pub fn is_internal_email(&self, email: &str) -> bool {
        let suffix = format!("@{}", self.email_domain);
        email
            .to_ascii_lowercase()
            .ends_with(&suffix.to_ascii_lowercase())
    }

    pub fn is_excluded(&self, repository: &str) -> bool {
        self.excludes.iter().any(|e| e == repository)
    }
}

/// `<home>/.roster/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".roster").join("config.yaml")
}

/// Load `<home>/.roster/config.yaml`, or defaults when it does not exist.
pub fn load_at(home: &Path) -> Result<RosterConfig, RosterError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(RosterConfig::default());
    }
    load_from(&path)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<RosterConfig, RosterError> {
    let home = dirs::home_dir().ok_or(RosterError::HomeNotFound)?;
    load_at(&home)
}

/// Load an explicit config file. A missing file is an error here.
pub fn load_from(path: &Path) -> Result<RosterConfig, RosterError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| RosterError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
