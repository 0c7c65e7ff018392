//! Forge access: the [`Forge`] trait and its GitHub implementation.
//!
//! [`GithubClient`] is a blocking `ureq` client for the GitHub REST v3 API.
//! List endpoints follow `Link: <...>; rel="next"` headers until exhausted.
//! Rate limiting and retries are left to the caller's scheduling: requests
//! are issued one at a time.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::ForgeError;
use crate::types::{Commit, Contributor, Repository, Team, User};

const PAGE_SIZE: u32 = 100;

/// Read-only operations the reconciliation engine needs from a forge.
pub trait Forge {
    /// Every repository owned by `org`.
    fn list_org_repositories(&self, org: &str) -> Result<Vec<Repository>, ForgeError>;

    fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError>;

    /// Contributors of `repo`, anonymous ones included.
    fn list_contributors(&self, repo: &Repository) -> Result<Vec<Contributor>, ForgeError>;

    fn list_commits(&self, repo: &Repository) -> Result<Vec<Commit>, ForgeError>;

    /// Fails with [`ForgeError::NotFound`] for an unknown login.
    fn get_user(&self, login: &str) -> Result<User, ForgeError>;

    fn get_team(&self, team_id: u64) -> Result<Team, ForgeError>;

    fn get_team_members(&self, team_id: u64) -> Result<Vec<User>, ForgeError>;
}

impl<T: Forge + ?Sized> Forge for &T {
    fn list_org_repositories(&self, org: &str) -> Result<Vec<Repository>, ForgeError> {
        (**self).list_org_repositories(org)
    }

    fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError> {
        (**self).get_repository(owner, name)
    }

    fn list_contributors(&self, repo: &Repository) -> Result<Vec<Contributor>, ForgeError> {
        (**self).list_contributors(repo)
    }

    fn list_commits(&self, repo: &Repository) -> Result<Vec<Commit>, ForgeError> {
        (**self).list_commits(repo)
    }

    fn get_user(&self, login: &str) -> Result<User, ForgeError> {
        (**self).get_user(login)
    }

    fn get_team(&self, team_id: u64) -> Result<Team, ForgeError> {
        (**self).get_team(team_id)
    }

    fn get_team_members(&self, team_id: u64) -> Result<Vec<User>, ForgeError> {
        (**self).get_team_members(team_id)
    }
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// Blocking GitHub REST client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(15))
            .timeout_read(Duration::from_secs(60))
            .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn call(&self, url: &str) -> Result<ureq::Response, ForgeError> {
        let mut request = self
            .agent
            .get(url)
            .set("Accept", "application/vnd.github+json");
        if let Some(token) = self.token.as_deref() {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        tracing::debug!(%url, "GET");
        match request.call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(404, _)) => Err(ForgeError::NotFound {
                url: url.to_string(),
            }),
            Err(ureq::Error::Status(code, _)) => Err(ForgeError::Status {
                code,
                url: url.to_string(),
            }),
            Err(ureq::Error::Transport(err)) => Err(ForgeError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }),
        }
    }

    fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T, ForgeError> {
        let url = self.url(path);
        let response = self.call(&url)?;
        response
            .into_json()
            .map_err(|source| ForgeError::Decode { url, source })
    }

    /// Every page of a list endpoint. `204 No Content` is an empty list.
    fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ForgeError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut next = Some(self.url(&format!("{path}{separator}per_page={PAGE_SIZE}")));
        let mut items = Vec::new();
        while let Some(url) = next.take() {
            let response = self.call(&url)?;
            if response.status() == 204 {
                break;
            }
            next = response.header("link").and_then(next_link);
            let page: Vec<T> = response
                .into_json()
                .map_err(|source| ForgeError::Decode { url, source })?;
            items.extend(page);
        }
        Ok(items)
    }
}

impl Forge for GithubClient {
    fn list_org_repositories(&self, org: &str) -> Result<Vec<Repository>, ForgeError> {
        self.get_all(&format!("/orgs/{org}/repos"))
    }

    fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError> {
        self.get_one(&format!("/repos/{owner}/{name}"))
    }

    fn list_contributors(&self, repo: &Repository) -> Result<Vec<Contributor>, ForgeError> {
        self.get_all(&format!("/repos/{}/contributors?anon=1", repo.slug()))
    }

    fn list_commits(&self, repo: &Repository) -> Result<Vec<Commit>, ForgeError> {
        self.get_all(&format!("/repos/{}/commits", repo.slug()))
    }

    fn get_user(&self, login: &str) -> Result<User, ForgeError> {
        self.get_one(&format!("/users/{login}"))
    }

    fn get_team(&self, team_id: u64) -> Result<Team, ForgeError> {
        self.get_one(&format!("/teams/{team_id}"))
    }

    fn get_team_members(&self, team_id: u64) -> Result<Vec<User>, ForgeError> {
        self.get_all(&format!("/teams/{team_id}/members"))
    }
}

/// Extract the `rel="next"` target of a `Link` header.
pub(crate) fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == r#"rel="next""#);
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
