//! Relay Core - Core library for Review Relay
//!
//! This crate maps code-review events from GitHub onto Slack notifications
//! and builds per-user digests of pull requests awaiting review. Network
//! access is abstracted behind the [`PullSearch`] and [`Dispatcher`] traits,
//! which are implemented by the `relay-github` and `relay-slack` crates.

pub mod config;
pub mod directory;
pub mod error;
pub mod event;
pub mod format;
pub mod pulls;
pub mod relay;
pub mod secrets;

pub use config::{Config, DirectoryConfig, GitHubConfig, ServerConfig, SlackConfig};
pub use directory::{Directory, IdentityKind, User};
pub use error::{Error, Result};
pub use event::{PullRef, ReviewEvent, WebhookPayload};
pub use format::{format_digest, format_review_request, Block, Message, OrganizationDigest};
pub use pulls::{aggregate, PullSearch, PullSummary, QueryKind, ReviewQueue, SearchItem, SearchQuery};
pub use relay::{Dispatcher, Outcome, Relay};
pub use secrets::Secrets;
