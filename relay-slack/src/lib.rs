//! Relay Slack - Slack delivery for Review Relay
//!
//! Implements [`relay_core::Dispatcher`] by posting messages through the
//! Slack Web API `chat.postMessage` method.

mod client;
mod error;

pub use client::SlackClient;
pub use error::ChannelError;
