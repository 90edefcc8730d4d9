//! CLI command implementations

pub mod digest;
pub mod directory;
pub mod serve;

pub use digest::DigestArgs;
pub use directory::DirectoryArgs;
pub use serve::ServeArgs;

use std::sync::Arc;

use anyhow::Context;
use relay_core::{Config, Relay, Secrets};
use relay_github::GitHubClient;
use relay_slack::SlackClient;

/// Wire the directory, GitHub search and Slack delivery into a [`Relay`]
///
/// Any failure here is a startup failure: malformed directory, missing
/// tokens or unusable API URLs.
pub fn build_relay(config: &Config) -> anyhow::Result<Relay> {
    let directory = config
        .load_directory()
        .context("Failed to load user directory")?;

    let secrets = Secrets::load().context("Failed to load secrets")?;
    let github_token = secrets.github_token().context(
        "GitHub token not found. Set GITHUB_TOKEN or add it to ~/.config/review-relay/secrets.toml",
    )?;
    let slack_token = secrets.slack_token().context(
        "Slack token not found. Set SLACK_TOKEN or add it to ~/.config/review-relay/secrets.toml",
    )?;

    let github = GitHubClient::new(
        github_token,
        config.github.api_url.as_deref(),
        config.github.timeout,
    )?;
    let slack = SlackClient::new(slack_token, config.slack.api_url.clone(), config.slack.timeout)?;

    if config.github.organizations.is_empty() {
        tracing::warn!("No organizations configured; digests will be empty");
    }

    tracing::info!(
        users = directory.len(),
        organizations = config.github.organizations.len(),
        "Relay initialized"
    );

    Ok(Relay::new(
        Arc::new(directory),
        Arc::new(github),
        Arc::new(slack),
        config.github.organizations.clone(),
    ))
}
