//! Roster core library: identity records, the roster store, persistence, config.
//!
//! - [`types`]: [`Developer`], [`Company`], [`Profile`]
//! - [`store`]: [`RosterStore`] and its login / display-name indexes
//! - [`roster_file`]: tab-separated load / save
//! - [`config`]: organization settings
//! - [`error`]: [`RosterError`]

pub mod config;
pub mod error;
pub mod roster_file;
pub mod store;
pub mod types;

pub use config::{RosterConfig, TeamConfig};
pub use error::RosterError;
pub use roster_file::SaveReport;
pub use store::{DeveloperId, RosterStore};
pub use types::{Company, Developer, Profile};
