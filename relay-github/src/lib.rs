//! Relay GitHub - GitHub integration for Review Relay
//!
//! This crate implements [`relay_core::PullSearch`] on top of the GitHub
//! issue search API.

mod client;
mod error;
mod search;

pub use client::GitHubClient;
pub use error::{Error, Result};
