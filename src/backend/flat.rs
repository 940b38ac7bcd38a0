//! Flat-namespace backend
//!
//! No POSIX permission model, no atomic rename. Quarantine is a
//! copy-then-delete-then-tag sequence with no cross-step atomicity: after
//! a completed copy and before a completed delete, both objects exist. A
//! failure in that window is logged with both paths; nothing here rolls
//! the copy back.

use std::sync::Arc;

use async_trait::async_trait;

use super::{QuarantineOutcome, SanitizeOutcome, StorageBackend};
use crate::error::Result;
use crate::store::ObjectStore;
use crate::types::{ChangeEvent, QuarantineRecord};

pub struct FlatBackend {
    store: Arc<dyn ObjectStore>,
    suffix: String,
}

impl FlatBackend {
    pub fn new(store: Arc<dyn ObjectStore>, suffix: impl Into<String>) -> Self {
        Self {
            store,
            suffix: suffix.into(),
        }
    }
}

#[async_trait]
impl StorageBackend for FlatBackend {
    async fn sanitize(&self, _event: &ChangeEvent) -> Result<SanitizeOutcome> {
        Ok(SanitizeOutcome::Unsupported)
    }

    async fn quarantine(&self, event: &ChangeEvent) -> Result<QuarantineOutcome> {
        let quarantined_path = event.quarantined_path(&self.suffix);

        self.store
            .copy(&event.container, &event.path, &quarantined_path)
            .await?;

        // Both objects exist until the delete lands.
        tracing::debug!(
            container = %event.container,
            path = %event.path,
            quarantined_path = %quarantined_path,
            "Copy complete, original still present"
        );

        if let Err(err) = self.store.delete(&event.container, &event.path).await {
            tracing::error!(
                container = %event.container,
                path = %event.path,
                quarantined_path = %quarantined_path,
                error = %err,
                "Delete after copy failed, original and copy both exist"
            );
            return Err(err);
        }

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
                    "Copy and delete succeeded but tagging failed"
                );
                Ok(QuarantineOutcome::Partial {
                    quarantined_path,
                    reason: err.to_string(),
                })
            }
        }
    }

    fn name(&self) -> &str {
        "flat"
    }
}
