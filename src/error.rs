//! Error types for upload-warden

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while processing a change notification
///
/// Every variant except `Config` is local to a single event: the pipeline
/// reports it as that event's outcome and moves on to the next one.
/// `Config` aborts the whole invocation — without valid configuration no
/// event can be safely processed.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Message body is not valid UTF-8 — the whole message is skipped
    #[error("Message body is not valid UTF-8: {0}")]
    Decode(String),

    /// Notification shape could not be resolved into (container, path)
    #[error("Unrecognizable event shape: {0}")]
    Parse(String),

    /// Required configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Permission string is not the expected 9-character rwx form
    #[error("Unexpected permission string on '{path}': expected 9 characters, found {length}")]
    AclFormat { path: String, length: usize },

    /// Access control read failed against the backend
    #[error("Failed to read access control for '{path}': {reason}")]
    AclRead { path: String, reason: String },

    /// Access control write failed against the backend
    #[error("Failed to write access control for '{path}': {reason}")]
    AclWrite { path: String, reason: String },

    /// Rename step of a quarantine failed
    #[error("Failed to rename '{path}': {reason}")]
    Rename { path: String, reason: String },

    /// Copy step of a flat-backend quarantine failed
    #[error("Failed to copy '{path}': {reason}")]
    Copy { path: String, reason: String },

    /// Delete step of a flat-backend quarantine failed
    #[error("Failed to delete '{path}': {reason}")]
    Delete { path: String, reason: String },

    /// Metadata tagging of a quarantined object failed
    #[error("Failed to set metadata on '{path}': {reason}")]
    Metadata { path: String, reason: String },
}

impl WardenError {
    /// The reporting kind for this error, used in per-event outcomes
    pub fn kind(&self) -> ErrorKind {
        match self {
            WardenError::Decode(_) => ErrorKind::Decode,
            WardenError::Parse(_) => ErrorKind::Parse,
            WardenError::Config(_) => ErrorKind::Config,
            WardenError::AclFormat { .. } => ErrorKind::AclFormat,
            WardenError::AclRead { .. } => ErrorKind::AclRead,
            WardenError::AclWrite { .. } => ErrorKind::AclWrite,
            WardenError::Rename { .. } => ErrorKind::Rename,
            WardenError::Copy { .. } => ErrorKind::Copy,
            WardenError::Delete { .. } => ErrorKind::Delete,
            WardenError::Metadata { .. } => ErrorKind::Metadata,
        }
    }
}

/// Error classification carried by `EventOutcome::Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Decode,
    Parse,
    Config,
    AclFormat,
    AclRead,
    AclWrite,
    Rename,
    Copy,
    Delete,
    Metadata,
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, WardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let err = WardenError::Rename {
            path: "a/b.exe".to_string(),
            reason: "409".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Rename);

        let err = WardenError::Decode("invalid utf-8".to_string());
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = WardenError::AclFormat {
            path: "a/b".to_string(),
            length: 4,
        };
        assert_eq!(err.kind(), ErrorKind::AclFormat);
    }

    #[test]
    fn test_error_display_includes_path() {
        let err = WardenError::Delete {
            path: "uploads/evil.exe.sus".to_string(),
            reason: "412 Precondition Failed".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("uploads/evil.exe.sus"));
        assert!(text.contains("412"));
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::AclRead).unwrap();
        assert_eq!(json, "\"aclRead\"");

        let parsed: ErrorKind = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(parsed, ErrorKind::Delete);
    }
}
