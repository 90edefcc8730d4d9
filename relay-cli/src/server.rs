//! HTTP surface: GitHub webhooks in, pull digests out

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use relay_core::{Message, Outcome, Relay, ReviewEvent, WebhookPayload};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared handler state
pub type AppState = Arc<Relay>;

/// Error body returned for every failed request
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

/// A relay error rendered as a 500 response
#[derive(Debug)]
pub struct ApiError(relay_core::Error);

impl From<relay_core::Error> for ApiError {
    fn from(err: relay_core::Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        match &self.0 {
            relay_core::Error::IdentityNotFound { .. } => {
                warn!(code, error = %self.0, "Request failed")
            }
            _ => error!(code, error = %self.0, "Request failed"),
        }

        let body = ErrorBody {
            code,
            message: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Digest request body for `POST /pulls`
#[derive(Debug, Deserialize)]
pub struct PullsRequest {
    pub user_id: String,
}

/// Subset of a Slack slash-command form body
#[derive(Debug, Deserialize)]
pub struct SlashCommand {
    pub user_id: String,
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Serialize)]
struct SlashResponse {
    response_type: &'static str,
    #[serde(flatten)]
    message: Message,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/events", post(events))
        .route("/pulls", post(pulls))
        .route("/slack/commands/pulls", post(slash_pulls))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!(address = %listener.local_addr()?, "Listening for requests");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn index() -> &'static str {
    "Review Relay"
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "review-relay"
    }))
}

async fn events(
    State(relay): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let github_event = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let event = match decode_webhook(&headers, &body) {
        Some(payload) => ReviewEvent::from_payload(&payload),
        None => {
            warn!(github_event, bytes = body.len(), "Undecodable webhook body");
            ReviewEvent::Other("undecodable".to_string())
        }
    };
    debug!(github_event, kind = event.kind(), "Webhook received");

    match relay.handle_event(event).await? {
        Outcome::Dispatched { channel } => debug!(channel = %channel, "Notification sent"),
        Outcome::Ignored { kind } => debug!(kind = %kind, "Event ignored"),
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Decode a webhook delivered as JSON or as a form with a `payload` field
fn decode_webhook(headers: &HeaderMap, body: &[u8]) -> Option<WebhookPayload> {
    let form_encoded = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

    if form_encoded {
        let (_, payload) = url::form_urlencoded::parse(body).find(|(key, _)| key == "payload")?;
        serde_json::from_str(&payload).ok()
    } else {
        serde_json::from_slice(body).ok()
    }
}

async fn pulls(
    State(relay): State<AppState>,
    Json(request): Json<PullsRequest>,
) -> Result<Json<Message>, ApiError> {
    let message = relay.pull_digest(&request.user_id).await?;
    Ok(Json(message))
}

async fn slash_pulls(
    State(relay): State<AppState>,
    Form(command): Form<SlashCommand>,
) -> Result<Json<SlashResponse>, ApiError> {
    debug!(command = ?command.command, user = %command.user_id, "Slash command received");

    let message = relay.pull_digest(&command.user_id).await?;
    Ok(Json(SlashResponse {
        response_type: "ephemeral",
        message,
    }))
}
