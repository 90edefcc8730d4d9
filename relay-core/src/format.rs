//! Slack message formatting
//!
//! Messages are either a single line of mrkdwn text or a sequence of Block Kit
//! blocks. Both serialize to the JSON shape Slack accepts in `chat.postMessage`
//! and in slash-command responses.

use serde::Serialize;

use crate::event::PullRef;
use crate::pulls::{PullSummary, ReviewQueue};

/// Text shown for a digest category with no pulls
pub const EMPTY_CATEGORY: &str = "_No pull requests_";

const REVIEW_REQUESTED_LABEL: &str = "Review requested";
const REVIEWED_LABEL: &str = "Reviewed";

/// A notification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Message {
    /// Single-line notification
    Text { text: String },
    /// Structured digest
    Blocks { blocks: Vec<Block> },
}

/// A Slack Block Kit block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Header { text: TextObject },
    Section { text: TextObject },
    Divider,
}

/// A Slack text composition object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    #[serde(rename = "mrkdwn")]
    Markdown { text: String },
}

impl TextObject {
    pub fn text(&self) -> &str {
        match self {
            TextObject::Plain { text } | TextObject::Markdown { text } => text,
        }
    }
}

impl Block {
    fn header(text: impl Into<String>) -> Self {
        Block::Header {
            text: TextObject::Plain { text: text.into() },
        }
    }

    fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: TextObject::Markdown { text: text.into() },
        }
    }
}

impl Message {
    /// Flatten to plain text, one line per block
    ///
    /// Used as the notification fallback text and for terminal output.
    pub fn plain_text(&self) -> String {
        match self {
            Message::Text { text } => text.clone(),
            Message::Blocks { blocks } => blocks
                .iter()
                .map(|block| match block {
                    Block::Header { text } | Block::Section { text } => text.text().to_string(),
                    Block::Divider => "---".to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Aggregated pulls for one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationDigest {
    pub organization: String,
    pub queue: ReviewQueue,
}

/// Render per-organization queues into a digest, in the order given
pub fn format_digest(digests: &[OrganizationDigest]) -> Message {
    if digests.is_empty() {
        return Message::Blocks {
            blocks: vec![Block::section("No organizations configured")],
        };
    }

    let mut blocks = Vec::with_capacity(digests.len() * 4);
    for (idx, digest) in digests.iter().enumerate() {
        if idx > 0 {
            blocks.push(Block::Divider);
        }
        blocks.push(Block::header(digest.organization.clone()));
        blocks.push(Block::section(category(
            REVIEW_REQUESTED_LABEL,
            &digest.queue.review_requested,
        )));
        blocks.push(Block::section(category(
            REVIEWED_LABEL,
            &digest.queue.reviewed,
        )));
    }

    Message::Blocks { blocks }
}

fn category(label: &str, pulls: &[PullSummary]) -> String {
    let mut text = format!("*{}*\n", label);
    if pulls.is_empty() {
        text.push_str(EMPTY_CATEGORY);
    } else {
        let lines: Vec<String> = pulls
            .iter()
            .map(|pull| format!("• <{}|{}>", pull.url, escape(&pull.title)))
            .collect();
        text.push_str(&lines.join("\n"));
    }
    text
}

/// Render the direct message sent to a requested reviewer
pub fn format_review_request(requester: &str, pull: &PullRef) -> Message {
    Message::Text {
        text: format!(
            "{} requested your review on <{}|PR#{}>: {}",
            escape(requester),
            pull.url,
            pull.number,
            escape(&pull.title)
        ),
    }
}

/// Escape the characters Slack mrkdwn treats as control sequences
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
