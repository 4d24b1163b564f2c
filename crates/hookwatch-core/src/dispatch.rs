use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::clock::{Clock, SystemClock};
use crate::event::{CanonicalEvent, EventAction};
use crate::normalize::normalize;
use crate::payload::{is_true_at, str_at};
use crate::store::EventStore;

/// Event-type header values that can produce a record.
pub const PUSH_EVENT: &str = "push";
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// Result of one ingestion attempt.
#[derive(Debug)]
pub enum IngestOutcome {
    /// The record was normalized and appended.
    Processed(CanonicalEvent),
    /// No dispatch rule matched; nothing was stored.
    Ignored,
    /// Storage rejected the record.
    Failed(String),
}

impl IngestOutcome {
    /// Short label used as the `outcome` log field.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Processed(_) => "processed",
            Self::Ignored => "ignored",
            Self::Failed(_) => "failed",
        }
    }
}

/// Decide which canonical kind, if any, a delivery maps to.
///
/// Rules apply in order and the first match wins: any `push`; a
/// `pull_request` with action `opened`; a `pull_request` with action `closed`
/// whose `pull_request.merged` is `true`. Everything else is ignored.
pub fn route(event_type: &str, payload: &Value) -> Option<EventAction> {
    match event_type {
        PUSH_EVENT => Some(EventAction::Push),
        PULL_REQUEST_EVENT => match str_at(payload, &["action"]) {
            Some("opened") => Some(EventAction::PullRequest),
            Some("closed") if is_true_at(payload, &["pull_request", "merged"]) => {
                Some(EventAction::Merge)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Routes webhook deliveries to normalizers and appends the results.
pub struct Dispatcher {
    store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(store: Arc<dyn EventStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Ingest one delivery. Storage is called at most once and never retried.
    pub async fn ingest(&self, event_type: &str, payload: Value) -> IngestOutcome {
        let Some(action) = route(event_type, &payload) else {
            debug!(event_type, "webhook ignored");
            return IngestOutcome::Ignored;
        };

        let record = normalize(action, &payload).into_canonical(self.clock.now(), payload);

        match self.store.append(&record).await {
            Ok(record_id) => {
                info!(
                    event_type,
                    action = %record.action,
                    record_id = %record_id,
                    author = %record.author,
                    "webhook processed"
                );
                IngestOutcome::Processed(record)
            }
            Err(e) => {
                error!(event_type, action = %record.action, error = %e, "webhook ingestion failed");
                IngestOutcome::Failed(e.to_string())
            }
        }
    }
}
