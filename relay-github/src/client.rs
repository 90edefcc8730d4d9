//! GitHub API client using octocrab

use std::time::Duration;

use crate::{Error, Result};
use octocrab::Octocrab;
use tracing::info;

/// GitHub API client scoped to the authenticated token
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// `api_url` overrides the API base for GitHub Enterprise. `timeout`
    /// bounds connecting to and reading from the API.
    pub fn new(token: impl Into<String>, api_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .personal_token(token.into())
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout));

        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| Error::Auth(format!("Invalid GitHub API URL {}: {}", url, e)))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(api_url = api_url.unwrap_or("https://api.github.com"), "Created GitHub client");

        Ok(Self { client })
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}
