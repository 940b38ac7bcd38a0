//! Hierarchical-namespace backend
//!
//! Uses the namespace's POSIX ACLs for sanitization and its atomic rename
//! for quarantine. Rename and the provenance tag are two separate calls;
//! a rename that lands without its tag is still a quarantine, reported as
//! partial.

use std::sync::Arc;

use async_trait::async_trait;

use super::{QuarantineOutcome, SanitizeOutcome, StorageBackend};
use crate::acl::AccessControlEntry;
use crate::error::Result;
use crate::store::ObjectStore;
use crate::types::{ChangeEvent, QuarantineRecord};

pub struct HnsBackend {
    store: Arc<dyn ObjectStore>,
    suffix: String,
}

impl HnsBackend {
    pub fn new(store: Arc<dyn ObjectStore>, suffix: impl Into<String>) -> Self {
        Self {
            store,
            suffix: suffix.into(),
        }
    }
}

#[async_trait]
impl StorageBackend for HnsBackend {
    async fn sanitize(&self, event: &ChangeEvent) -> Result<SanitizeOutcome> {
        let permissions = self
            .store
            .get_access_control(&event.container, &event.path)
            .await?;

        let mut entry = AccessControlEntry::parse(&event.path, &permissions)?;
        if !entry.strip_execute() {
            return Ok(SanitizeOutcome::Clean);
        }

        self.store
            .set_access_control(&event.container, &event.path, &entry.to_string())
            .await?;

        tracing::info!(
            container = %event.container,
            path = %event.path,
            "Cleared execute bits"
        );
        Ok(SanitizeOutcome::Stripped)
    }

    async fn quarantine(&self, event: &ChangeEvent) -> Result<QuarantineOutcome> {
        let quarantined_path = event.quarantined_path(&self.suffix);

        self.store
            .rename(&event.container, &event.path, &quarantined_path)
            .await?;

        let record = QuarantineRecord::new(&event.name);
        match self
            .store
            .set_metadata(&event.container, &quarantined_path, &record.to_metadata())
            .await
        {
            Ok(()) => Ok(QuarantineOutcome::Quarantined { quarantined_path }),
            Err(err) => {
                tracing::warn!(
                    container = %event.container,
                    path = %quarantined_path,
                    error = %err,
                    "Rename succeeded but tagging failed"
                );
                Ok(QuarantineOutcome::Partial {
                    quarantined_path,
                    reason: err.to_string(),
                })
            }
        }
    }

    fn name(&self) -> &str {
        "hierarchical"
    }
}
