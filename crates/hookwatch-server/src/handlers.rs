//! HTTP handlers for webhook intake, the read API and the dashboard.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, warn};

use hookwatch_core::IngestOutcome;

use crate::server::AppState;

/// Header carrying the webhook event type.
pub const EVENT_TYPE_HEADER: &str = "x-github-event";

const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

/// Acknowledgement body returned to the webhook sender.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub message: String,
}

impl WebhookAck {
    fn new(status: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Map an ingestion outcome onto the HTTP reply.
pub fn ack_for(outcome: &IngestOutcome) -> (StatusCode, WebhookAck) {
    match outcome {
        IngestOutcome::Processed(_) => {
            (StatusCode::OK, WebhookAck::new("success", "Event processed"))
        }
        IngestOutcome::Ignored => (
            StatusCode::OK,
            WebhookAck::new("ignored", "Event type not processed"),
        ),
        IngestOutcome::Failed(reason) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            WebhookAck::new("error", reason.clone()),
        ),
    }
}

/// `POST /webhook`
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event_type = headers
        .get(EVENT_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(event_type, error = %e, "webhook body is not JSON");
            let ack = WebhookAck::new("error", format!("invalid JSON body: {e}"));
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(ack)).into_response();
        }
    };

    let outcome = state.dispatcher.ingest(event_type, payload).await;
    debug!(event_type, outcome = outcome.status(), "webhook acknowledged");
    let (status, ack) = ack_for(&outcome);
    (status, Json(ack)).into_response()
}

/// `GET /api/events`
pub async fn latest_events(State(state): State<AppState>) -> Response {
    match state.feed.latest().await {
        Ok(events) => Json(events).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// `GET /`
pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// `GET /health`: healthy when the store answers a one-row read.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.fetch_latest(1).await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" }))),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unhealthy", "error": e.to_string() })),
            )
        }
    }
}
