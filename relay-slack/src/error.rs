//! Error types for Slack delivery.

use thiserror::Error;

/// Errors that can occur when posting to Slack.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered with `ok: false`
    #[error("Slack API error: {0}")]
    Api(String),

    /// Slack answered with a non-success HTTP status
    #[error("Slack returned HTTP {0}")]
    Status(u16),
}

impl From<ChannelError> for relay_core::Error {
    fn from(err: ChannelError) -> Self {
        relay_core::Error::Upstream(err.to_string())
    }
}
