//! Pure mappings from webhook payloads to [`NormalizedEvent`]s.
//!
//! None of these can fail: every field has a declared default and timestamps
//! that do not parse are kept as-is.

use serde_json::Value;

use crate::event::{EventAction, NormalizedEvent};
use crate::payload::text_at;
use crate::timestamp::format_timestamp;

const UNKNOWN_AUTHOR: &str = "Unknown";
const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Normalize a `push` payload.
pub fn normalize_push(payload: &Value) -> NormalizedEvent {
    let git_ref = text_at(payload, &["ref"], "");
    let to_branch = git_ref
        .strip_prefix(BRANCH_REF_PREFIX)
        .unwrap_or(&git_ref)
        .to_owned();

    build(
        EventAction::Push,
        text_at(payload, &["after"], ""),
        text_at(payload, &["pusher", "name"], UNKNOWN_AUTHOR),
        None,
        to_branch,
        &text_at(payload, &["head_commit", "timestamp"], ""),
    )
}

/// Normalize a `pull_request` payload whose action is `opened`.
pub fn normalize_pull_request_opened(payload: &Value) -> NormalizedEvent {
    build(
        EventAction::PullRequest,
        text_at(payload, &["pull_request", "id"], ""),
        text_at(payload, &["pull_request", "user", "login"], UNKNOWN_AUTHOR),
        Some(text_at(payload, &["pull_request", "head", "ref"], "")),
        text_at(payload, &["pull_request", "base", "ref"], ""),
        &text_at(payload, &["pull_request", "created_at"], ""),
    )
}

/// Normalize a `pull_request` payload that was closed by a merge.
pub fn normalize_merge(payload: &Value) -> NormalizedEvent {
    build(
        EventAction::Merge,
        text_at(payload, &["pull_request", "id"], ""),
        text_at(payload, &["pull_request", "merged_by", "login"], UNKNOWN_AUTHOR),
        Some(text_at(payload, &["pull_request", "head", "ref"], "")),
        text_at(payload, &["pull_request", "base", "ref"], ""),
        &text_at(payload, &["pull_request", "merged_at"], ""),
    )
}

/// Run the normalizer for `action`.
pub fn normalize(action: EventAction, payload: &Value) -> NormalizedEvent {
    match action {
        EventAction::Push => normalize_push(payload),
        EventAction::PullRequest => normalize_pull_request_opened(payload),
        EventAction::Merge => normalize_merge(payload),
    }
}

fn build(
    action: EventAction,
    id: String,
    author: String,
    from_branch: Option<String>,
    to_branch: String,
    raw_timestamp: &str,
) -> NormalizedEvent {
    let timestamp = format_timestamp(raw_timestamp);
    let message = action.compose_message(&author, from_branch.as_deref(), &to_branch, &timestamp);
    NormalizedEvent {
        id,
        author,
        to_branch,
        from_branch,
        timestamp,
        action,
        message,
    }
}
