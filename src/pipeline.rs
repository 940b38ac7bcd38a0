//! Per-message processing pipeline
//!
//! `Pipeline` sequences normalization, permission sanitization,
//! classification, and quarantine for every event a queue message carries.
//! Events are processed sequentially and independently; one event's
//! failure at any stage becomes its own outcome and never blocks the
//! rest of the batch.

use std::sync::Arc;

use crate::backend::{backend_for, QuarantineOutcome, StorageBackend};
use crate::classify::classify;
use crate::config::Config;
use crate::error::{Result, WardenError};
use crate::event::{decode_body, resolve_event, split_body};
use crate::redact::redact;
use crate::store::ObjectStore;
use crate::types::{ChangeEvent, EventOutcome};

/// Message pipeline over a storage backend
pub struct Pipeline {
    config: Arc<Config>,
    backend: Arc<dyn StorageBackend>,
}

impl Pipeline {
    /// Build a pipeline over an object store, selecting the backend
    /// variant from configuration
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Result<Self> {
        let backend = backend_for(&config, store);
        Self::with_backend(config, backend)
    }

    /// Build a pipeline with an explicit backend
    pub fn with_backend(config: Config, backend: Arc<dyn StorageBackend>) -> Result<Self> {
        if config.account.is_empty() {
            return Err(WardenError::Config(
                "Storage account is required".to_string(),
            ));
        }

        tracing::info!(
            account = %config.account,
            backend = backend.name(),
            mode = %config.mode,
            "Pipeline ready"
        );

        Ok(Self {
            config: Arc::new(config),
            backend,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The selected backend variant's name
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Process one raw queue message body
    ///
    /// A body that fails UTF-8 decoding yields zero outcomes. Each
    /// notification that cannot be resolved yields an error outcome; the
    /// rest flow through [`Pipeline::process_event`].
    pub async fn process_message(&self, body: &[u8]) -> Vec<EventOutcome> {
        let text = match decode_body(body) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping undecodable message");
                return Vec::new();
            }
        };

        tracing::info!(raw = %redact(text), "Received message");

        let mut outcomes = Vec::new();
        for raw in split_body(text) {
            match resolve_event(&raw) {
                Ok(event) => outcomes.push(self.process_event(&event).await),
                Err(err) => {
                    tracing::warn!(error = %err, "Unable to resolve container/path");
                    outcomes.push(EventOutcome::unresolved(&err));
                }
            }
        }
        outcomes
    }

    /// Process already-resolved events sequentially
    pub async fn process(&self, events: &[ChangeEvent]) -> Vec<EventOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.process_event(event).await);
        }
        outcomes
    }

    /// Process a single event: sanitize, classify, quarantine if dangerous
    pub async fn process_event(&self, event: &ChangeEvent) -> EventOutcome {
        tracing::info!(container = %event.container, path = %event.path, "Resolved object");

        // Best-effort; a failure here never affects the quarantine decision.
        if let Err(err) = self.backend.sanitize(event).await {
            tracing::warn!(
                container = %event.container,
                path = %event.path,
                error = %err,
                "Permission sanitization failed"
            );
        }

        let classification = classify(&event.name, &self.config);
        if !classification.dangerous {
            tracing::info!(name = %event.name, mode = %classification.mode, "Object allowed");
            return EventOutcome::Allowed {
                container: event.container.clone(),
                path: event.path.clone(),
                name: event.name.clone(),
            };
        }

        match self.backend.quarantine(event).await {
            Ok(QuarantineOutcome::Quarantined { quarantined_path }) => {
                tracing::info!(
                    path = %event.path,
                    quarantined_path = %quarantined_path,
                    "Object quarantined"
                );
                EventOutcome::Quarantined {
                    container: event.container.clone(),
                    path: event.path.clone(),
                    quarantined_path,
                }
            }
            Ok(QuarantineOutcome::Partial {
                quarantined_path,
                reason,
            }) => {
                tracing::warn!(
                    path = %event.path,
                    quarantined_path = %quarantined_path,
                    reason = %reason,
                    "Object quarantined without provenance tag"
                );
                EventOutcome::PartialQuarantine {
                    container: event.container.clone(),
                    path: event.path.clone(),
                    quarantined_path,
                    reason,
                }
            }
            Err(err) => {
                tracing::error!(
                    container = %event.container,
                    path = %event.path,
                    error = %err,
                    "Quarantine failed"
                );
                EventOutcome::failed(event, &err)
            }
        }
    }
}
