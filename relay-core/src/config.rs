//! Configuration management for Review Relay
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (PORT, RELAY_*)
//! 3. Config file (~/.config/review-relay/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::{Directory, User};
use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// GitHub-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Organizations included in pull digests, in display order
    pub organizations: Vec<String>,

    /// API base URL (for GitHub Enterprise)
    pub api_url: Option<String>,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            organizations: Vec::new(),
            api_url: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Slack-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Web API base URL
    pub api_url: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_url: "https://slack.com/api".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Where directory entries come from
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// JSON file holding an array of `{gname, name, sid}` entries
    pub path: Option<PathBuf>,

    /// Inline entries, used when no path is set
    pub users: Vec<User>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub slack: SlackConfig,
    pub directory: DirectoryConfig,

    /// Inline directory JSON from RELAY_USERS; takes precedence over the
    /// `[directory]` table
    #[serde(skip)]
    pub users_json: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/review-relay/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("review-relay").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - PORT: Port to listen on
    /// - RELAY_HOST: Address to bind
    /// - RELAY_ORGANIZATIONS: Comma-separated organization list
    /// - RELAY_DIRECTORY: Path to the directory JSON file
    /// - RELAY_USERS: Inline directory JSON
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT: {}", port)))?;
        }

        if let Some(host) = var("RELAY_HOST") {
            self.server.host = host;
        }

        if let Some(orgs) = var("RELAY_ORGANIZATIONS") {
            self.github.organizations = parse_list(&orgs);
        }

        if let Some(path) = var("RELAY_DIRECTORY") {
            self.directory.path = Some(PathBuf::from(path));
        }

        if let Some(users) = var("RELAY_USERS") {
            self.users_json = Some(users);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }

        if let Some(port) = port {
            self.server.port = port;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(config.with_env_overrides()?.with_cli_overrides(host, port))
    }

    /// Build the user directory from whichever source is configured
    ///
    /// Priority: RELAY_USERS > directory.path > inline `[[directory.users]]`
    pub fn load_directory(&self) -> Result<Directory> {
        if let Some(ref json) = self.users_json {
            debug!("Loading directory from RELAY_USERS");
            return Directory::from_json(json);
        }

        if let Some(ref path) = self.directory.path {
            debug!(path = %path.display(), "Loading directory from file");
            return Directory::load(path);
        }

        Directory::from_users(self.directory.users.clone())
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.slack.api_url, "https://slack.com/api");
        assert_eq!(config.github.timeout, Duration::from_secs(10));
        assert!(config.github.organizations.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[server]
port = 9000

[github]
organizations = ["acme", "globex"]
timeout = "30s"

[slack]
api_url = "http://localhost:1234/api"

[[directory.users]]
gname = "alice"
name = "Alice A"
sid = "U1"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.github.organizations, vec!["acme", "globex"]);
        assert_eq!(config.github.timeout, Duration::from_secs(30));
        assert_eq!(config.slack.timeout, Duration::from_secs(10));

        let directory = config.load_directory().unwrap();
        assert_eq!(directory.lookup_by_chat_id("U1").unwrap().github_login, "alice");
    }

    #[test]
    fn test_malformed_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\norganizations = \"acme\"").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides_from(env(&[
                ("PORT", "3000"),
                ("RELAY_ORGANIZATIONS", "acme, globex,,"),
                ("RELAY_USERS", r#"[{"gname":"bob","name":"Bob B","sid":"U2"}]"#),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.github.organizations, vec!["acme", "globex"]);
        assert!(config.load_directory().unwrap().lookup_by_chat_id("U2").is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::default()
            .with_overrides_from(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::default()
            .with_overrides_from(env(&[("PORT", "3000")]))
            .unwrap()
            .with_cli_overrides(Some("127.0.0.1".to_string()), Some(4000));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_directory_path_preferred_over_inline() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"gname":"carol","name":"Carol C","sid":"U3"}}]"#).unwrap();

        let mut config = Config::default();
        config.directory.users = vec![User {
            github_login: "alice".to_string(),
            display_name: "Alice A".to_string(),
            chat_id: "U1".to_string(),
        }];
        config.directory.path = Some(file.path().to_path_buf());

        let directory = config.load_directory().unwrap();
        assert!(directory.lookup_by_chat_id("U3").is_ok());
        assert!(directory.lookup_by_chat_id("U1").is_err());
    }

    #[test]
    fn test_malformed_directory_env() {
        let config = Config::default()
            .with_overrides_from(env(&[("RELAY_USERS", "not json")]))
            .unwrap();
        assert!(matches!(config.load_directory(), Err(Error::Config(_))));
    }
}
