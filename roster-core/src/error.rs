//! Error types for roster-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from roster persistence and configuration.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Underlying I/O failure, annotated with the file involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tab-separated codec failure while reading or writing the roster file.
    #[error("roster file error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Malformed config YAML. The source carries line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`RosterError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RosterError {
    RosterError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`RosterError::Csv`].
pub(crate) fn csv_err(path: impl Into<PathBuf>, source: csv::Error) -> RosterError {
    RosterError::Csv {
        path: path.into(),
        source,
    }
}
