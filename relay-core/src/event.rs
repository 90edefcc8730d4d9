//! GitHub webhook payloads and the review events derived from them

use serde::{Deserialize, Serialize};

/// Subset of a GitHub `pull_request` / `pull_request_review` webhook body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    pub action: Option<String>,
    pub pull_request: Option<WebhookPull>,
    pub requested_reviewer: Option<Account>,
    pub requested_team: Option<Team>,
    pub review: Option<WebhookReview>,
    pub sender: Option<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPull {
    /// Browser URL of the pull request
    pub html_url: Option<String>,
    /// API URL; used only when `html_url` is absent
    pub url: Option<String>,
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub user: Option<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookReview {
    pub state: Option<String>,
    pub user: Option<Account>,
}

/// Reference to a pull request in a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRef {
    pub url: String,
    pub number: u64,
    pub title: String,
}

impl From<&WebhookPull> for PullRef {
    fn from(pull: &WebhookPull) -> Self {
        PullRef {
            url: pull
                .html_url
                .clone()
                .or_else(|| pull.url.clone())
                .unwrap_or_default(),
            number: pull.number,
            title: pull.title.clone(),
        }
    }
}

/// A code-review lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    /// `reviewer` has been asked to review a pull opened by `author`
    ReviewRequested {
        pull: PullRef,
        author: String,
        reviewer: String,
    },
    /// `reviewer` submitted a review
    ReviewSubmitted {
        pull: PullRef,
        reviewer: String,
        state: String,
    },
    /// Any event kind without a handler
    Other(String),
}

impl ReviewEvent {
    /// Classify a webhook body
    ///
    /// Payloads missing the fields a kind requires fall back to `Other`, so
    /// unexpected shapes are ignored rather than rejected.
    pub fn from_payload(payload: &WebhookPayload) -> Self {
        let action = payload.action.as_deref().unwrap_or("unknown");

        match (action, &payload.pull_request) {
            ("review_requested", Some(pull)) => {
                let author = pull.user.as_ref().map(|u| u.login.clone());
                match (author, &payload.requested_reviewer) {
                    (Some(author), Some(reviewer)) => ReviewEvent::ReviewRequested {
                        pull: pull.into(),
                        author,
                        reviewer: reviewer.login.clone(),
                    },
                    _ if payload.requested_team.is_some() => {
                        ReviewEvent::Other("review_requested:team".to_string())
                    }
                    _ => ReviewEvent::Other(action.to_string()),
                }
            }
            ("submitted", Some(pull)) => match &payload.review {
                Some(review) => ReviewEvent::ReviewSubmitted {
                    pull: pull.into(),
                    reviewer: review
                        .user
                        .as_ref()
                        .or(payload.sender.as_ref())
                        .map(|u| u.login.clone())
                        .unwrap_or_default(),
                    state: review.state.clone().unwrap_or_default(),
                },
                None => ReviewEvent::Other(action.to_string()),
            },
            _ => ReviewEvent::Other(action.to_string()),
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &str {
        match self {
            ReviewEvent::ReviewRequested { .. } => "review_requested",
            ReviewEvent::ReviewSubmitted { .. } => "submitted",
            ReviewEvent::Other(kind) => kind,
        }
    }
}
