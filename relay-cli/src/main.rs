//! Relay CLI - Command line interface and HTTP server for Review Relay
//!
//! Relays GitHub review requests to Slack and serves pull request digests.

mod commands;
mod server;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relay_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{DigestArgs, DirectoryArgs, ServeArgs};

/// Review Relay: GitHub review notifications for Slack
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/review-relay/config.toml)
    #[arg(short, long, global = true, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the webhook and digest HTTP server
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Print the pull request digest for a Slack user
    #[command(visible_alias = "d")]
    Digest(DigestArgs),

    /// Validate and list the user directory
    Directory(DirectoryArgs),

    /// Create a secrets file template
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Some(Commands::Version) => {
            println!("relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(cli.config.as_deref()).await?;
        }
        Some(Commands::Digest(args)) => {
            args.execute(cli.config.as_deref()).await?;
        }
        Some(Commands::Directory(args)) => {
            args.execute(cli.config.as_deref())?;
        }
        Some(Commands::Init) => {
            let path = Secrets::create_template()?;
            println!("Created secrets template at {}", path.display());
            println!("Add your GitHub and Slack tokens, then run 'relay serve'.");
        }
        Some(Commands::Config) => {
            let config = Config::load_with_overrides(cli.config.as_deref(), None, None)?;
            print_config(&config, cli.config.as_deref());
        }
        None => {
            println!("Review Relay - GitHub review notifications for Slack");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit_path: Option<&std::path::Path>) {
    println!("Review Relay Configuration");
    println!("==========================");
    println!();
    println!("Server:");
    println!("  listen: {}:{}", config.server.host, config.server.port);
    println!();
    println!("GitHub:");
    if config.github.organizations.is_empty() {
        println!("  organizations: (none)");
    } else {
        println!("  organizations: {}", config.github.organizations.join(", "));
    }
    println!(
        "  api_url: {}",
        config.github.api_url.as_deref().unwrap_or("(default)")
    );
    println!("  timeout: {:?}", config.github.timeout);
    println!();
    println!("Slack:");
    println!("  api_url: {}", config.slack.api_url);
    println!("  timeout: {:?}", config.slack.timeout);
    println!();
    println!("Directory:");
    if config.users_json.is_some() {
        println!("  source: RELAY_USERS");
    } else if let Some(ref path) = config.directory.path {
        println!("  source: {}", path.display());
    } else {
        println!("  source: inline ({} entries)", config.directory.users.len());
    }
    println!();

    let path = explicit_path
        .map(std::path::Path::to_path_buf)
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
