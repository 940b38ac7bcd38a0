//! Core types for the upload-warden pipeline
//!
//! All types use camelCase JSON serialization for wire compatibility.

use crate::error::{ErrorKind, WardenError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A single storage-change event resolved from an upstream notification
///
/// Immutable once constructed; owned by exactly one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Container (file system) holding the object
    pub container: String,

    /// Object path within the container, `/`-separated
    pub path: String,

    /// Object name — the last path segment
    pub name: String,
}

impl ChangeEvent {
    /// Create an event from a resolved (container, path) pair
    ///
    /// The object name is derived from the last path segment.
    pub fn new(container: impl Into<String>, path: impl Into<String>) -> Self {
        let container = container.into();
        let path = path.into();
        let name = derive_name(&path).to_string();
        Self {
            container,
            path,
            name,
        }
    }

    /// The path this object moves to when quarantined
    ///
    /// `suffix` is the normalized leading-dot quarantine suffix.
    pub fn quarantined_path(&self, suffix: &str) -> String {
        format!("{}{}", self.path, suffix)
    }
}

/// Last path segment (or the whole path when it has no separators)
fn derive_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Classification policy selecting how extensions are judged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenameMode {
    /// Dangerous iff the extension is in the configured blocklist
    #[default]
    Blocklist,
    /// Dangerous iff the extension (dot included) is exactly 4 characters
    ///
    /// Deliberately coarse — flags many benign three-letter extensions.
    SuffixLengthFour,
}

impl RenameMode {
    /// The configuration keyword for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            RenameMode::Blocklist => "blocklist",
            RenameMode::SuffixLengthFour => "suffix-length-four",
        }
    }
}

impl fmt::Display for RenameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenameMode {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocklist" => Ok(RenameMode::Blocklist),
            "suffix-length-four" => Ok(RenameMode::SuffixLengthFour),
            other => Err(WardenError::Config(format!(
                "Unknown rename mode '{}' (expected 'blocklist' or 'suffix-length-four')",
                other
            ))),
        }
    }
}

/// Pure result of classifying one object name against the active policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// The object name that was classified
    pub name: String,

    /// Whether the name matched the active danger policy
    pub dangerous: bool,

    /// Which policy mode produced this verdict
    pub mode: RenameMode,
}

/// Provenance metadata attached to a quarantined object
///
/// Written once, at the moment of a successful rename; never updated
/// afterward — objects whose name carries the quarantine suffix are not
/// re-processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantineRecord {
    /// Always true for a written record
    pub quarantined: bool,

    /// Object name before the quarantine suffix was appended
    pub original_name: String,

    /// When the quarantine rename succeeded
    pub quarantined_at_utc: DateTime<Utc>,
}

impl QuarantineRecord {
    /// Create a record for an object quarantined now
    pub fn new(original_name: impl Into<String>) -> Self {
        Self {
            quarantined: true,
            original_name: original_name.into(),
            quarantined_at_utc: Utc::now(),
        }
    }

    /// The metadata key/value form written to the storage backend
    pub fn to_metadata(&self) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert("quarantined".to_string(), self.quarantined.to_string());
        metadata.insert("originalName".to_string(), self.original_name.clone());
        metadata.insert(
            "ts".to_string(),
            self.quarantined_at_utc
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        );
        metadata
    }
}

/// Per-event outcome reported by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum EventOutcome {
    /// Object passed classification; nothing was mutated
    #[serde(rename_all = "camelCase")]
    Allowed {
        container: String,
        path: String,
        name: String,
    },

    /// Object was renamed to the quarantine path and tagged
    #[serde(rename_all = "camelCase")]
    Quarantined {
        container: String,
        path: String,
        quarantined_path: String,
    },

    /// Object was relocated but tagging failed — quarantine holds, tag missing
    #[serde(rename_all = "camelCase")]
    PartialQuarantine {
        container: String,
        path: String,
        quarantined_path: String,
        reason: String,
    },

    /// Processing failed at some stage; siblings in the batch continue
    #[serde(rename_all = "camelCase")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        kind: ErrorKind,
        reason: String,
    },
}

impl EventOutcome {
    /// Build an error outcome for a resolved event
    pub fn failed(event: &ChangeEvent, err: &WardenError) -> Self {
        EventOutcome::Error {
            container: Some(event.container.clone()),
            path: Some(event.path.clone()),
            kind: err.kind(),
            reason: err.to_string(),
        }
    }

    /// Build an error outcome for a notification that never resolved
    pub fn unresolved(err: &WardenError) -> Self {
        EventOutcome::Error {
            container: None,
            path: None,
            kind: err.kind(),
            reason: err.to_string(),
        }
    }

    /// Short label for structured logging
    pub fn label(&self) -> &'static str {
        match self {
            EventOutcome::Allowed { .. } => "allowed",
            EventOutcome::Quarantined { .. } => "quarantined",
            EventOutcome::PartialQuarantine { .. } => "partial",
            EventOutcome::Error { .. } => "error",
        }
    }
}
