//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Search query rejected by GitHub
    #[error("GitHub rejected search '{query}': {message}")]
    InvalidQuery { query: String, message: String },
}

impl From<Error> for relay_core::Error {
    fn from(err: Error) -> Self {
        relay_core::Error::Upstream(err.to_string())
    }
}
