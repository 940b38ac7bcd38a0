//! Storage backend capability — sanitize and quarantine over an object store
//!
//! The two backend variants implement the same pair of operations with
//! different mutation semantics. A hierarchical namespace supports POSIX
//! ACLs and atomic rename; a flat namespace has no permission model and
//! relocates objects by copy-then-delete. The variant is selected once at
//! startup from configuration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;
use crate::store::ObjectStore;
use crate::types::ChangeEvent;

pub mod flat;
pub mod hierarchical;

pub use flat::FlatBackend;
pub use hierarchical::HnsBackend;

/// What permission sanitization did for one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeOutcome {
    /// Execute bits were set and have been cleared
    Stripped,
    /// No execute bits were set; no write was issued
    Clean,
    /// The backend has no permission model to sanitize
    Unsupported,
}

/// How a quarantine mutation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuarantineOutcome {
    /// The object was relocated to its quarantine path and tagged
    Quarantined { quarantined_path: String },
    /// The object was relocated but the provenance tag could not be
    /// written; it is neutralized either way
    Partial {
        quarantined_path: String,
        reason: String,
    },
}

/// One backend variant's mutation semantics
///
/// `sanitize` is best-effort and independent of the quarantine decision;
/// callers treat its errors as warnings. `quarantine` is invoked only for
/// objects classified dangerous.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Remove execute permissions from an object, where the backend has any
    async fn sanitize(&self, event: &ChangeEvent) -> Result<SanitizeOutcome>;

    /// Relocate a dangerous object to its quarantine path and tag it
    async fn quarantine(&self, event: &ChangeEvent) -> Result<QuarantineOutcome>;

    /// Variant name for logs ("hierarchical", "flat")
    fn name(&self) -> &str;
}

/// Select the backend variant for `config`, sharing one object store
pub fn backend_for(config: &Config, store: Arc<dyn ObjectStore>) -> Arc<dyn StorageBackend> {
    if config.hierarchical {
        Arc::new(HnsBackend::new(store, config.quarantine_suffix.clone()))
    } else {
        Arc::new(FlatBackend::new(store, config.quarantine_suffix.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_backend_selection_follows_config() {
        let store = Arc::new(MemoryStore::default());

        let hns = backend_for(&Config::new("acct"), store.clone());
        assert_eq!(hns.name(), "hierarchical");

        let flat = backend_for(&Config::new("acct").with_hierarchical(false), store);
        assert_eq!(flat.name(), "flat");
    }
}
