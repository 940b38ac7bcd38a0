//! # upload-warden
//!
//! Quarantine pipeline for storage-upload change notifications.
//!
//! ## Overview
//!
//! `upload-warden` inspects storage change events and neutralizes
//! dangerous uploads: it strips accidental execute permissions and
//! renames objects whose extension matches a risk policy, tagging the
//! result with provenance metadata. Swap object stores (REST, in-memory)
//! and backend variants (hierarchical, flat) without changing pipeline
//! code.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use upload_warden::{Config, MemoryStore, Pipeline};
//!
//! # async fn example() -> upload_warden::Result<()> {
//! // Process one queue message against an in-memory store
//! let store = Arc::new(MemoryStore::default());
//! store.insert("uploads", "a/evil.exe").await;
//!
//! let pipeline = Pipeline::new(Config::new("scratch54"), store)?;
//! let outcomes = pipeline
//!     .process_message(
//!         br#"{"subject":"/blobServices/default/containers/uploads/blobs/a/evil.exe"}"#,
//!     )
//!     .await;
//!
//! println!("outcome: {}", outcomes[0].label());
//! # Ok(())
//! # }
//! ```
//!
//! ## Backends
//!
//! - **hierarchical** — POSIX ACL sanitization and atomic rename
//! - **flat** — copy-then-delete quarantine, no permission model
//!
//! ## Architecture
//!
//! - **ObjectStore** trait — raw storage operations (REST, in-memory)
//! - **StorageBackend** trait — sanitize/quarantine semantics per namespace kind
//! - **Pipeline** — per-message orchestration with per-event failure isolation
//! - **EventOutcome** — structured result for every processed event

pub mod acl;
pub mod backend;
pub mod classify;
pub mod config;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod redact;
pub mod store;
pub mod types;

// Re-export core types
pub use acl::AccessControlEntry;
pub use classify::classify;
pub use config::Config;
pub use error::{ErrorKind, Result, WardenError};
pub use event::{normalize, RawNotification};
pub use pipeline::Pipeline;
pub use redact::redact;
pub use types::{ChangeEvent, Classification, EventOutcome, QuarantineRecord, RenameMode};

// Re-export backends and stores for convenience
pub use backend::{
    backend_for, FlatBackend, HnsBackend, QuarantineOutcome, SanitizeOutcome, StorageBackend,
};
pub use store::{
    EnvCredential, MemoryStore, Mutation, ObjectStore, RestConfig, RestStore, StaticCredential,
    StoreOp, StoredObject, TokenCredential,
};
