use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RecordId;

/// Canonical kind of a repository event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Push,
    PullRequest,
    Merge,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Merge => "merge",
        }
    }

    /// Render the human-readable summary for an event of this kind.
    ///
    /// `from_branch` is ignored for pushes. For the pull-request kinds a
    /// missing source branch renders as an empty string.
    pub fn compose_message(
        &self,
        author: &str,
        from_branch: Option<&str>,
        to_branch: &str,
        timestamp: &str,
    ) -> String {
        let from = from_branch.unwrap_or_default();
        match self {
            Self::Push => format!("{author} pushed to {to_branch} on {timestamp}"),
            Self::PullRequest => format!(
                "{author} submitted a pull request from {from} to {to_branch} on {timestamp}"
            ),
            Self::Merge => format!("{author} merged branch {from} to {to_branch} on {timestamp}"),
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(Self::Push),
            "pull_request" => Ok(Self::PullRequest),
            "merge" => Ok(Self::Merge),
            other => Err(format!("unknown event action: {other}")),
        }
    }
}

/// Output of a normalizer: the canonical fields before ingestion metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: String,
    pub author: String,
    pub to_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_branch: Option<String>,
    pub timestamp: String,
    pub action: EventAction,
    pub message: String,
}

impl NormalizedEvent {
    /// Recompute the summary from the other fields.
    pub fn render_message(&self) -> String {
        self.action.compose_message(
            &self.author,
            self.from_branch.as_deref(),
            &self.to_branch,
            &self.timestamp,
        )
    }

    /// Attach ingestion metadata, producing the persisted record.
    pub fn into_canonical(
        self,
        created_at: DateTime<Utc>,
        raw_payload: serde_json::Value,
    ) -> CanonicalEvent {
        CanonicalEvent {
            id: self.id,
            author: self.author,
            to_branch: self.to_branch,
            from_branch: self.from_branch,
            timestamp: self.timestamp,
            action: self.action,
            message: self.message,
            created_at,
            raw_payload,
        }
    }
}

/// The persisted event record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub id: String,
    pub author: String,
    pub to_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_branch: Option<String>,
    pub timestamp: String,
    pub action: EventAction,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub raw_payload: serde_json::Value,
}

impl CanonicalEvent {
    pub fn render_message(&self) -> String {
        self.action.compose_message(
            &self.author,
            self.from_branch.as_deref(),
            &self.to_branch,
            &self.timestamp,
        )
    }

    /// Read-side projection without the retained payload.
    pub fn to_view(&self) -> EventView {
        EventView {
            id: self.id.clone(),
            author: self.author.clone(),
            to_branch: self.to_branch.clone(),
            from_branch: self.from_branch.clone(),
            timestamp: self.timestamp.clone(),
            action: self.action,
            message: self.message.clone(),
            created_at: self.created_at,
        }
    }
}

/// A record as handed back by storage, carrying its storage identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredEvent {
    pub record_id: RecordId,
    pub event: CanonicalEvent,
}

/// Shape served to the dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventView {
    pub id: String,
    pub author: String,
    pub to_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_branch: Option<String>,
    pub timestamp: String,
    pub action: EventAction,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
