//! Queue notification normalization
//!
//! Turns a raw queue message body into structured [`ChangeEvent`]s. A body
//! may carry a single JSON notification, a JSON array of notifications, or
//! (from non-standard producers) a bare object URL as plain text. Container
//! and path are resolved from the `subject` field when its `containers` /
//! `blobs` anchors are present, falling back to `data.url` otherwise.

use serde_json::Value;
use url::Url;

use crate::error::{Result, WardenError};
use crate::types::ChangeEvent;

/// One notification extracted from a queue message body.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNotification {
    /// A parsed JSON value (object, or an element of a top-level array).
    Json(Value),
    /// A body that is not JSON, carried verbatim as a URL candidate.
    Text(String),
}

/// Decode a message body as UTF-8.
pub fn decode_body(body: &[u8]) -> Result<&str> {
    std::str::from_utf8(body).map_err(|err| WardenError::Decode(err.to_string()))
}

/// Split a decoded body into individual notifications.
///
/// A JSON array yields one notification per element; any other JSON value
/// is a single notification. A body that does not parse as JSON is kept
/// whole as a [`RawNotification::Text`] URL candidate.
pub fn split_body(text: &str) -> Vec<RawNotification> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(elements)) => elements.into_iter().map(RawNotification::Json).collect(),
        Ok(value) => vec![RawNotification::Json(value)],
        Err(_) => vec![RawNotification::Text(text.to_string())],
    }
}

/// Resolve a notification into a container and object path.
///
/// JSON notifications are tried against the `subject` anchors first, then
/// against `data.url`. Text notifications are parsed as a bare URL. A
/// notification yielding no non-empty container and path is a parse error;
/// the message itself never carries the failure to sibling notifications.
pub fn resolve_event(raw: &RawNotification) -> Result<ChangeEvent> {
    match raw {
        RawNotification::Json(value) => resolve_subject(value)
            .or_else(|| resolve_url_field(value))
            .ok_or_else(|| {
                WardenError::Parse("notification has no resolvable container/path".to_string())
            }),
        RawNotification::Text(body) => resolve_from_url(body).ok_or_else(|| {
            WardenError::Parse("body is not a resolvable object url".to_string())
        }),
    }
}

/// Normalize a raw message body into change events.
///
/// Notifications that cannot be resolved are logged and dropped; only a
/// non-UTF-8 body fails the whole message.
pub fn normalize(body: &[u8]) -> Result<Vec<ChangeEvent>> {
    let text = decode_body(body)?;
    let mut events = Vec::new();
    for raw in split_body(text) {
        match resolve_event(&raw) {
            Ok(event) => events.push(event),
            Err(err) => tracing::warn!(error = %err, "Dropping unresolvable notification"),
        }
    }
    Ok(events)
}

/// Strategy (a): `subject` of the form
/// `/blobServices/default/containers/<container>/blobs/<path...>`.
///
/// Anchors are matched at their first occurrence. Yields `None` unless both
/// anchors are present and produce a non-empty container and path.
fn resolve_subject(value: &Value) -> Option<ChangeEvent> {
    let subject = value.get("subject")?.as_str()?;
    let parts: Vec<&str> = subject.split('/').collect();
    let cidx = parts.iter().position(|p| *p == "containers")?;
    let bidx = parts.iter().position(|p| *p == "blobs")?;
    let container = parts.get(cidx + 1).copied()?;
    let path = parts.get(bidx + 1..)?.join("/");
    if container.is_empty() || path.is_empty() {
        return None;
    }
    Some(ChangeEvent::new(container, path))
}

/// Strategy (b): `data.url` of the form `scheme://host/<container>/<path...>`.
fn resolve_url_field(value: &Value) -> Option<ChangeEvent> {
    let url = value.get("data")?.get("url")?.as_str()?;
    resolve_from_url(url)
}

fn resolve_from_url(raw: &str) -> Option<ChangeEvent> {
    let url = Url::parse(raw.trim()).ok()?;
    url.host_str()?;
    let mut segments = url.path_segments()?;
    let container = segments.next()?.to_string();
    let path = segments.collect::<Vec<_>>().join("/");
    if container.is_empty() || path.is_empty() {
        return None;
    }
    Some(ChangeEvent::new(container, path))
}
