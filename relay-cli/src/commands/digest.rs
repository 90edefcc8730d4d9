//! Digest command - print the pull request digest for a Slack user

use std::path::Path;

use clap::Args;
use relay_core::Config;

/// Arguments for the digest command
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Slack user id (e.g. U024BE7LH)
    #[arg(required = true)]
    pub user_id: String,

    /// Print the Slack block payload as JSON
    #[arg(long)]
    pub json: bool,
}

impl DigestArgs {
    /// Execute the digest command
    pub async fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(config_path, None, None)?;
        let relay = super::build_relay(&config)?;

        let message = relay.pull_digest(&self.user_id).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&message)?);
        } else {
            println!("{}", message.plain_text());
        }

        Ok(())
    }
}
