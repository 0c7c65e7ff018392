//! Error types for roster-forge.

use thiserror::Error;

/// Failures of a forge request.
///
/// Only [`ForgeError::NotFound`] is considered recoverable by callers; every
/// other variant aborts a run.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// The resource does not exist (HTTP 404).
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Any other non-success HTTP status.
    #[error("HTTP {code} from {url}")]
    Status { code: u16, url: String },

    /// Connection, DNS, or TLS failure.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The response body could not be decoded.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl ForgeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ForgeError::NotFound { .. })
    }
}
