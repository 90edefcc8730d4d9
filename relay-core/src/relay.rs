//! Event routing
//!
//! [`Relay`] ties the directory, the pull search and the chat dispatcher
//! together. It holds no per-request state, so one instance is shared by all
//! in-flight requests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::format::{format_digest, format_review_request, Message, OrganizationDigest};
use crate::pulls::{aggregate, PullSearch};
use crate::{Directory, Result, ReviewEvent};

/// Delivers a message to a chat destination
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Post `message` to `channel` (a Slack user or channel id)
    async fn dispatch(&self, channel: &str, message: &Message) -> Result<()>;
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A notification was delivered
    Dispatched { channel: String },
    /// The event kind has no handler
    Ignored { kind: String },
}

/// Routes review events to notifications and serves pull digests
pub struct Relay {
    directory: Arc<Directory>,
    search: Arc<dyn PullSearch>,
    dispatcher: Arc<dyn Dispatcher>,
    organizations: Vec<String>,
}

impl Relay {
    pub fn new(
        directory: Arc<Directory>,
        search: Arc<dyn PullSearch>,
        dispatcher: Arc<dyn Dispatcher>,
        organizations: Vec<String>,
    ) -> Self {
        Self {
            directory,
            search,
            dispatcher,
            organizations,
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }

    /// Handle a single event
    ///
    /// Unknown kinds are ignored rather than rejected so the webhook sender
    /// does not retry them.
    pub async fn handle_event(&self, event: ReviewEvent) -> Result<Outcome> {
        match event {
            ReviewEvent::ReviewRequested {
                pull,
                author,
                reviewer,
            } => {
                let author = self.directory.lookup_by_source_control_id(&author)?;
                let reviewer = self.directory.lookup_by_source_control_id(&reviewer)?;

                let message = format_review_request(&author.display_name, &pull);
                self.dispatcher.dispatch(&reviewer.chat_id, &message).await?;

                info!(
                    pull = pull.number,
                    author = %author.github_login,
                    reviewer = %reviewer.github_login,
                    "Review request delivered"
                );

                Ok(Outcome::Dispatched {
                    channel: reviewer.chat_id.clone(),
                })
            }
            ReviewEvent::ReviewSubmitted {
                pull,
                reviewer,
                state,
            } => {
                info!(pull = pull.number, reviewer = %reviewer, state = %state, "Review submitted");
                Ok(Outcome::Ignored {
                    kind: "submitted".to_string(),
                })
            }
            ReviewEvent::Other(kind) => {
                info!(kind = %kind, "Unhandled event kind");
                Ok(Outcome::Ignored { kind })
            }
        }
    }

    /// Build the pull digest for the user with the given Slack id
    pub async fn pull_digest(&self, chat_id: &str) -> Result<Message> {
        let user = self.directory.lookup_by_chat_id(chat_id)?;
        debug!(user = %user.github_login, orgs = self.organizations.len(), "Building digest");

        let mut digests = Vec::with_capacity(self.organizations.len());
        for organization in &self.organizations {
            let queue = aggregate(self.search.as_ref(), organization, &user.github_login).await?;
            digests.push(OrganizationDigest {
                organization: organization.clone(),
                queue,
            });
        }

        Ok(format_digest(&digests))
    }
}
