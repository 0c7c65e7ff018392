//! # roster-reconcile
//!
//! Reconciles forge accounts, anonymous commit authors and the stored roster
//! into one record per person.
//!
//! Call [`pipeline::run`] for a complete load → reconcile → save run, or drive
//! a [`Reconciler`] directly.

pub mod cache;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod repos;

pub use cache::CommitCache;
pub use engine::{ReconcileSummary, Reconciler};
pub use error::ReconcileError;
pub use pipeline::{run, RunOptions, RunReport};
pub use repos::{RepoRef, RepoSelection};
