//! Object store trait — the raw storage surface backends are built on
//!
//! Store implementations (REST, in-memory) expose the individual object
//! operations a storage account offers: ACL read/write, rename, copy,
//! delete, and metadata writes. Quarantine semantics live a level up in
//! [`crate::backend`]; a store only executes single calls and reports
//! op-specific errors.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Result, WardenError};

pub mod memory;
pub mod rest;

pub use memory::{MemoryStore, Mutation, StoreOp, StoredObject};
pub use rest::{RestConfig, RestStore};

/// Raw object operations against one storage account
///
/// Implementations map transport failures to the matching error kind
/// (`AclRead`, `AclWrite`, `Rename`, `Copy`, `Delete`, `Metadata`) so the
/// caller can report precise outcomes without inspecting reasons.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the POSIX-style permission string of an object
    async fn get_access_control(&self, container: &str, path: &str) -> Result<String>;

    /// Write the permission string of an object
    async fn set_access_control(&self, container: &str, path: &str, permissions: &str)
        -> Result<()>;

    /// Atomically rename an object within its container
    async fn rename(&self, container: &str, from: &str, to: &str) -> Result<()>;

    /// Copy an object within its container
    ///
    /// Completion is awaited; a copy left pending by the account is an
    /// error, not a success.
    async fn copy(&self, container: &str, from: &str, to: &str) -> Result<()>;

    /// Delete an object
    async fn delete(&self, container: &str, path: &str) -> Result<()>;

    /// Replace an object's user metadata
    async fn set_metadata(
        &self,
        container: &str,
        path: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()>;
}

/// Environment variable read by [`EnvCredential::default`].
pub const ENV_BEARER_TOKEN: &str = "STORAGE_BEARER_TOKEN";

/// Source of bearer tokens for storage API calls
///
/// The narrow seam in front of whatever identity machinery the process
/// runs under. Stores request a token per call; caching is the
/// implementation's business.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Produce a bearer token
    async fn token(&self) -> Result<String>;
}

/// A fixed, pre-acquired token
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticCredential {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// A token read from the process environment on every call
///
/// Lets an external refresher rotate the token without restarting the
/// process.
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(ENV_BEARER_TOKEN)
    }
}

#[async_trait]
impl TokenCredential for EnvCredential {
    async fn token(&self) -> Result<String> {
        std::env::var(&self.var).map_err(|_| {
            WardenError::Config(format!("{} environment variable is required", self.var))
        })
    }
}
