//! Optional-chain reads over loosely structured webhook JSON.
//!
//! Every accessor takes an explicit default; a missing key, a non-object
//! intermediate or a value of the wrong shape all fall back to it.

use serde_json::Value;

/// Walk `path` through nested objects.
pub fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(payload, |current, key| current.as_object()?.get(*key))
}

/// Scalar text at `path`. Strings are returned verbatim and numbers in their
/// decimal form; anything else yields `default`.
pub fn text_at(payload: &Value, path: &[&str], default: &str) -> String {
    match lookup(payload, path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_owned(),
    }
}

/// String at `path`, if present and a string.
pub fn str_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(payload, path).and_then(Value::as_str)
}

/// True only when `path` holds the JSON boolean `true`.
pub fn is_true_at(payload: &Value, path: &[&str]) -> bool {
    matches!(lookup(payload, path), Some(Value::Bool(true)))
}
