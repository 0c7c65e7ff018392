//! # roster-forge
//!
//! Read-only access to the repository-hosting service.
//!
//! The reconciliation engine only sees the [`Forge`] trait; [`GithubClient`]
//! implements it over the GitHub REST API.

pub mod client;
pub mod error;
pub mod types;

pub use client::{Forge, GithubClient};
pub use error::ForgeError;
pub use types::{Commit, CommitDetail, Contributor, GitIdentity, Repository, Team, User};
