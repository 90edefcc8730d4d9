//! Serve command - run the HTTP server

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use relay_core::Config;

use crate::server;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides config and env)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config and env)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(config_path, self.host.clone(), self.port)?;
        let relay = super::build_relay(&config)?;

        server::serve(Arc::new(relay), &config.server.host, config.server.port).await
    }
}
