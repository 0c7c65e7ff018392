//! In-memory forge shared by the integration suites.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use roster_core::RosterConfig;
use roster_forge::{
    Commit, CommitDetail, Contributor, Forge, ForgeError, GitIdentity, Repository, Team, User,
};

pub const ORG: &str = "nuxeo";

#[derive(Debug)]
pub struct FakeForge {
    pub repositories: Vec<Repository>,
    pub contributors: HashMap<u64, Vec<Contributor>>,
    pub commits: HashMap<u64, Vec<Commit>>,
    pub broken_commit_lists: HashSet<u64>,
    pub users: HashMap<String, User>,
    pub broken_users: HashSet<String>,
    pub team: Team,
    pub members: Vec<User>,
    pub commit_list_calls: Cell<usize>,
    pub user_lookups: RefCell<Vec<String>>,
}

impl Default for FakeForge {
    fn default() -> Self {
        let config = RosterConfig::default();
        Self {
            repositories: Vec::new(),
            contributors: HashMap::new(),
            commits: HashMap::new(),
            broken_commit_lists: HashSet::new(),
            users: HashMap::new(),
            broken_users: HashSet::new(),
            team: Team {
                id: config.team.id,
                name: config.team.name,
            },
            members: Vec::new(),
            commit_list_calls: Cell::new(0),
            user_lookups: RefCell::new(Vec::new()),
        }
    }
}

impl FakeForge {
    pub fn with_repository(mut self, repo: Repository) -> Self {
        self.repositories.push(repo);
        self
    }

    pub fn with_contributors(mut self, repo_id: u64, contributors: Vec<Contributor>) -> Self {
        self.contributors.insert(repo_id, contributors);
        self
    }

    pub fn with_commits(mut self, repo_id: u64, commits: Vec<Commit>) -> Self {
        self.commits.insert(repo_id, commits);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        let login = user.login.clone().unwrap_or_default();
        self.users.insert(login, user);
        self
    }

    pub fn with_member(mut self, user: User) -> Self {
        self.members.push(user);
        self
    }

    fn not_found(what: &str) -> ForgeError {
        ForgeError::NotFound {
            url: format!("fake://{what}"),
        }
    }
}

impl Forge for FakeForge {
    fn list_org_repositories(&self, _org: &str) -> Result<Vec<Repository>, ForgeError> {
        Ok(self.repositories.clone())
    }

    fn get_repository(&self, owner: &str, name: &str) -> Result<Repository, ForgeError> {
        let slug = format!("{owner}/{name}");
        self.repositories
            .iter()
            .find(|r| r.slug() == slug)
            .cloned()
            .ok_or_else(|| Self::not_found(&slug))
    }

    fn list_contributors(&self, repo: &Repository) -> Result<Vec<Contributor>, ForgeError> {
        Ok(self.contributors.get(&repo.id).cloned().unwrap_or_default())
    }

    fn list_commits(&self, repo: &Repository) -> Result<Vec<Commit>, ForgeError> {
        self.commit_list_calls.set(self.commit_list_calls.get() + 1);
        if self.broken_commit_lists.contains(&repo.id) {
            return Err(ForgeError::Status {
                code: 500,
                url: format!("fake://{}/commits", repo.slug()),
            });
        }
        Ok(self.commits.get(&repo.id).cloned().unwrap_or_default())
    }

    fn get_user(&self, login: &str) -> Result<User, ForgeError> {
        self.user_lookups.borrow_mut().push(login.to_owned());
        if self.broken_users.contains(login) {
            return Err(ForgeError::Transport {
                url: format!("fake://users/{login}"),
                message: "connection reset".into(),
            });
        }
        self.users
            .get(login)
            .cloned()
            .ok_or_else(|| Self::not_found(login))
    }

    fn get_team(&self, team_id: u64) -> Result<Team, ForgeError> {
        if team_id == self.team.id {
            Ok(self.team.clone())
        } else {
            Err(Self::not_found(&format!("teams/{team_id}")))
        }
    }

    fn get_team_members(&self, _team_id: u64) -> Result<Vec<User>, ForgeError> {
        Ok(self.members.clone())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn repository(id: u64, name: &str) -> Repository {
    Repository {
        id,
        name: name.to_owned(),
        full_name: Some(format!("{ORG}/{name}")),
        html_url: format!("https://github.com/{ORG}/{name}"),
        is_private: false,
        is_fork: false,
    }
}

pub fn user(login: &str, name: Option<&str>, email: Option<&str>, company: Option<&str>) -> User {
    User {
        login: Some(login.to_owned()),
        name: name.map(str::to_owned),
        email: email.map(str::to_owned),
        url: Some(format!("https://github.com/{login}")),
        company: company.map(str::to_owned),
    }
}

pub fn contributor(login: &str) -> Contributor {
    Contributor {
        login: Some(login.to_owned()),
        url: Some(format!("https://x/{login}")),
        ..Contributor::default()
    }
}

pub fn anonymous_contributor(name: &str) -> Contributor {
    Contributor {
        name: Some(name.to_owned()),
        ..Contributor::default()
    }
}

/// A commit authored and committed by an identity with no linked account.
pub fn git_commit(repo: &Repository, sha: &str, name: &str, email: &str) -> Commit {
    let identity = GitIdentity {
        name: Some(name.to_owned()),
        email: Some(email.to_owned()),
    };
    Commit {
        sha: sha.to_owned(),
        url: format!("{}/commit/{sha}", repo.html_url),
        author: None,
        committer: None,
        commit: CommitDetail {
            author: Some(identity.clone()),
            committer: Some(identity),
        },
    }
}

/// A commit whose author and committer are linked to `account`.
pub fn account_commit(repo: &Repository, sha: &str, account: User) -> Commit {
    let identity = GitIdentity {
        name: account.name.clone(),
        email: account.email.clone(),
    };
    Commit {
        sha: sha.to_owned(),
        url: format!("{}/commit/{sha}", repo.html_url),
        author: Some(account.clone()),
        committer: Some(account),
        commit: CommitDetail {
            author: Some(identity.clone()),
            committer: Some(identity),
        },
    }
}
