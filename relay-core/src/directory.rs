//! Static identity directory
//!
//! Maps GitHub logins to Slack user ids and display names. The directory is
//! loaded once at startup and never changes afterwards.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// A single directory entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    /// GitHub login
    #[serde(rename = "gname")]
    pub github_login: String,
    /// Human-readable name used in notifications
    #[serde(rename = "name")]
    pub display_name: String,
    /// Slack user id, also used as the DM channel
    #[serde(rename = "sid")]
    pub chat_id: String,
}

/// Identity space a lookup is performed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// GitHub login
    SourceControl,
    /// Slack user id
    Chat,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKind::SourceControl => write!(f, "GitHub"),
            IdentityKind::Chat => write!(f, "chat"),
        }
    }
}

/// Read-only user directory indexed by both identity types
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: Vec<User>,
    by_github: HashMap<String, usize>,
    by_chat: HashMap<String, usize>,
}

impl Directory {
    /// Build a directory, rejecting duplicate logins or chat ids
    pub fn from_users(users: Vec<User>) -> Result<Self> {
        let mut by_github = HashMap::with_capacity(users.len());
        let mut by_chat = HashMap::with_capacity(users.len());

        for (idx, user) in users.iter().enumerate() {
            if user.github_login.is_empty() || user.chat_id.is_empty() {
                return Err(Error::Config(format!(
                    "Directory entry {} has an empty gname or sid",
                    idx
                )));
            }
            if by_github.insert(user.github_login.clone(), idx).is_some() {
                return Err(Error::Config(format!(
                    "Duplicate GitHub login in directory: {}",
                    user.github_login
                )));
            }
            if by_chat.insert(user.chat_id.clone(), idx).is_some() {
                return Err(Error::Config(format!(
                    "Duplicate chat id in directory: {}",
                    user.chat_id
                )));
            }
        }

        debug!(count = users.len(), "Directory built");

        Ok(Self {
            users,
            by_github,
            by_chat,
        })
    }

    /// Parse a directory from a JSON array of `{gname, name, sid}` objects
    pub fn from_json(json: &str) -> Result<Self> {
        let users: Vec<User> = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Failed to parse directory: {}", e)))?;
        Self::from_users(users)
    }

    /// Load a directory from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read directory file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    /// Find a user by GitHub login
    pub fn lookup_by_source_control_id(&self, login: &str) -> Result<&User> {
        self.by_github
            .get(login)
            .map(|&idx| &self.users[idx])
            .ok_or_else(|| Error::IdentityNotFound {
                kind: IdentityKind::SourceControl,
                id: login.to_string(),
            })
    }

    /// Find a user by Slack user id
    pub fn lookup_by_chat_id(&self, chat_id: &str) -> Result<&User> {
        self.by_chat
            .get(chat_id)
            .map(|&idx| &self.users[idx])
            .ok_or_else(|| Error::IdentityNotFound {
                kind: IdentityKind::Chat,
                id: chat_id.to_string(),
            })
    }

    /// Iterate over users in load order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
