//! Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use relay_core::{Block, Dispatcher, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChannelError;

/// Posts messages as a Slack bot user.
pub struct SlackClient {
    token: String,
    api_url: String,
    client: reqwest::Client,
}

/// `chat.postMessage` request body.
#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    /// Always set; Slack uses it for notifications when blocks are present
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<&'a [Block]>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    /// Create a client for the Web API at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        token: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            token: token.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Post a message to a user or channel id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Slack rejects the message.
    pub async fn post_message(&self, channel: &str, message: &Message) -> Result<(), ChannelError> {
        let body = PostMessage {
            channel,
            text: message.plain_text(),
            blocks: match message {
                Message::Blocks { blocks } => Some(blocks.as_slice()),
                Message::Text { .. } => None,
            },
        };

        debug!(channel, "Posting Slack message");

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(channel, status = status.as_u16(), "Slack returned error status");
            return Err(ChannelError::Status(status.as_u16()));
        }

        let api: ApiResponse = response.json().await?;
        if !api.ok {
            let error = api.error.unwrap_or_else(|| "unknown_error".to_string());
            warn!(channel, error = %error, "Slack rejected message");
            return Err(ChannelError::Api(error));
        }

        Ok(())
    }
}

#[async_trait]
impl Dispatcher for SlackClient {
    async fn dispatch(&self, channel: &str, message: &Message) -> relay_core::Result<()> {
        Ok(self.post_message(channel, message).await?)
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
