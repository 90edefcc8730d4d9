//! Error types for Review Relay

use thiserror::Error;

use crate::directory::IdentityKind;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for relay operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (malformed config, directory or secrets)
    #[error("Configuration error: {0}")]
    Config(String),

    /// An event or request named an identity that is not in the directory
    #[error("No directory entry for {kind} id '{id}'")]
    IdentityNotFound {
        /// Which identity space was searched
        kind: IdentityKind,
        /// The id that was looked up
        id: String,
    },

    /// A call to GitHub or Slack failed
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable machine-readable code used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Error::IdentityNotFound { .. } => "identity_not_found",
            Error::Upstream(_) => "upstream_failure",
            Error::Config(_) | Error::Io(_) | Error::Json(_) => "configuration_error",
            Error::Other(_) => "internal_error",
        }
    }
}
