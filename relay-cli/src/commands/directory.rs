//! Directory command - validate and list directory entries

use std::path::Path;

use clap::Args;
use relay_core::Config;

/// Arguments for the directory command
#[derive(Args, Debug)]
pub struct DirectoryArgs {
    /// Only validate, do not list entries
    #[arg(long)]
    pub check: bool,
}

impl DirectoryArgs {
    /// Execute the directory command
    pub fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(config_path, None, None)?;
        let directory = config.load_directory()?;

        if self.check {
            println!("Directory OK: {} entries", directory.len());
            return Ok(());
        }

        if directory.is_empty() {
            println!("Directory is empty.");
            return Ok(());
        }

        println!("{:<24} {:<16} NAME", "GITHUB", "SLACK");
        for user in directory.users() {
            println!(
                "{:<24} {:<16} {}",
                user.github_login, user.chat_id, user.display_name
            );
        }

        Ok(())
    }
}
