//! Wire records returned by the forge.
//!
//! Field names follow the GitHub REST v3 payloads. Every optional field is
//! `Option` + `#[serde(default)]`: the API omits or nulls them freely.

use serde::{Deserialize, Serialize};

/// A repository of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub html_url: String,
    #[serde(default, rename = "private")]
    pub is_private: bool,
    #[serde(default, rename = "fork")]
    pub is_fork: bool,
}

impl Repository {
    /// `owner/name`, falling back to the bare name.
    pub fn slug(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }
}

/// An entry of a repository's contributor list.
///
/// Anonymous contributors (commits not linked to an account) carry a `name`
/// and no `login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "html_url")]
    pub url: Option<String>,
}

/// An account on the forge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "html_url")]
    pub url: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// Free-text author or committer recorded in a git commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub author: Option<GitIdentity>,
    #[serde(default)]
    pub committer: Option<GitIdentity>,
}

/// A commit with its git identities and, when resolvable, the linked accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub sha: String,
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub committer: Option<User>,
    #[serde(default)]
    pub commit: CommitDetail,
}

impl Commit {
    /// `(account, git identity)` pairs for the author, then the committer.
    pub fn identities(&self) -> [(Option<&User>, Option<&GitIdentity>); 2] {
        [
            (self.author.as_ref(), self.commit.author.as_ref()),
            (self.committer.as_ref(), self.commit.committer.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
