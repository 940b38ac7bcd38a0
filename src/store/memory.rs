//! In-memory object store for development and testing
//!
//! Holds objects in a map keyed by (container, path), records every
//! mutation that reaches the account, and can inject per-operation
//! failures so partial-outcome paths can be exercised without a live
//! backend.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ObjectStore;
use crate::error::{Result, WardenError};

const NOT_FOUND: &str = "object not found";

/// A stored object: its permission string plus user metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub permissions: String,
    pub metadata: HashMap<String, String>,
}

impl Default for StoredObject {
    fn default() -> Self {
        Self {
            permissions: "rw-r--r--".to_string(),
            metadata: HashMap::new(),
        }
    }
}

/// One of the raw operations a store executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    AclRead,
    AclWrite,
    Rename,
    Copy,
    Delete,
    Metadata,
}

/// A mutation that was applied, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetAccessControl {
        container: String,
        path: String,
        permissions: String,
    },
    Rename {
        container: String,
        from: String,
        to: String,
    },
    Copy {
        container: String,
        from: String,
        to: String,
    },
    Delete {
        container: String,
        path: String,
    },
    SetMetadata {
        container: String,
        path: String,
    },
}

/// In-memory [`ObjectStore`]
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    mutations: RwLock<Vec<Mutation>>,
    faults: RwLock<HashSet<StoreOp>>,
}

impl MemoryStore {
    /// Seed an object with default permissions and no metadata.
    pub async fn insert(&self, container: &str, path: &str) {
        let mut objects = self.objects.write().await;
        objects.insert(key(container, path), StoredObject::default());
    }

    /// Seed an object with an explicit permission string.
    pub async fn insert_with_permissions(&self, container: &str, path: &str, permissions: &str) {
        let mut objects = self.objects.write().await;
        objects.insert(
            key(container, path),
            StoredObject {
                permissions: permissions.to_string(),
                metadata: HashMap::new(),
            },
        );
    }

    /// Snapshot an object, if present.
    pub async fn object(&self, container: &str, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(&key(container, path)).cloned()
    }

    /// Whether an object exists.
    pub async fn contains(&self, container: &str, path: &str) -> bool {
        self.objects.read().await.contains_key(&key(container, path))
    }

    /// All mutations applied so far, oldest first.
    pub async fn mutations(&self) -> Vec<Mutation> {
        self.mutations.read().await.clone()
    }

    /// Make every future call of `op` fail with its operation's error kind.
    pub async fn inject_failure(&self, op: StoreOp) {
        self.faults.write().await.insert(op);
    }

    async fn check(&self, op: StoreOp, path: &str) -> Result<()> {
        if self.faults.read().await.contains(&op) {
            return Err(fault_error(op, path));
        }
        Ok(())
    }

    async fn record(&self, mutation: Mutation) {
        self.mutations.write().await.push(mutation);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_access_control(&self, container: &str, path: &str) -> Result<String> {
        self.check(StoreOp::AclRead, path).await?;
        let objects = self.objects.read().await;
        objects
            .get(&key(container, path))
            .map(|object| object.permissions.clone())
            .ok_or_else(|| WardenError::AclRead {
                path: path.to_string(),
                reason: NOT_FOUND.to_string(),
            })
    }

    async fn set_access_control(
        &self,
        container: &str,
        path: &str,
        permissions: &str,
    ) -> Result<()> {
        self.check(StoreOp::AclWrite, path).await?;
        let mut objects = self.objects.write().await;
        let object = objects
            .get_mut(&key(container, path))
            .ok_or_else(|| WardenError::AclWrite {
                path: path.to_string(),
                reason: NOT_FOUND.to_string(),
            })?;
        object.permissions = permissions.to_string();
        drop(objects);
        self.record(Mutation::SetAccessControl {
            container: container.to_string(),
            path: path.to_string(),
            permissions: permissions.to_string(),
        })
        .await;
        Ok(())
    }

    async fn rename(&self, container: &str, from: &str, to: &str) -> Result<()> {
        self.check(StoreOp::Rename, from).await?;
        let mut objects = self.objects.write().await;
        let object = objects
            .remove(&key(container, from))
            .ok_or_else(|| WardenError::Rename {
                path: from.to_string(),
                reason: NOT_FOUND.to_string(),
            })?;
        objects.insert(key(container, to), object);
        drop(objects);
        self.record(Mutation::Rename {
            container: container.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
        .await;
        Ok(())
    }

    async fn copy(&self, container: &str, from: &str, to: &str) -> Result<()> {
        self.check(StoreOp::Copy, from).await?;
        let mut objects = self.objects.write().await;
        let object = objects
            .get(&key(container, from))
            .cloned()
            .ok_or_else(|| WardenError::Copy {
                path: from.to_string(),
                reason: NOT_FOUND.to_string(),
            })?;
        objects.insert(key(container, to), object);
        drop(objects);
        self.record(Mutation::Copy {
            container: container.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
        .await;
        Ok(())
    }

    async fn delete(&self, container: &str, path: &str) -> Result<()> {
        self.check(StoreOp::Delete, path).await?;
        let mut objects = self.objects.write().await;
        objects
            .remove(&key(container, path))
            .ok_or_else(|| WardenError::Delete {
                path: path.to_string(),
                reason: NOT_FOUND.to_string(),
            })?;
        drop(objects);
        self.record(Mutation::Delete {
            container: container.to_string(),
            path: path.to_string(),
        })
        .await;
        Ok(())
    }

    async fn set_metadata(
        &self,
        container: &str,
        path: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        self.check(StoreOp::Metadata, path).await?;
        let mut objects = self.objects.write().await;
        let object = objects
            .get_mut(&key(container, path))
            .ok_or_else(|| WardenError::Metadata {
                path: path.to_string(),
                reason: NOT_FOUND.to_string(),
            })?;
        // Replaces, not merges, matching the account's metadata write.
        object.metadata = metadata.clone();
        drop(objects);
        self.record(Mutation::SetMetadata {
            container: container.to_string(),
            path: path.to_string(),
        })
        .await;
        Ok(())
    }
}

fn key(container: &str, path: &str) -> (String, String) {
    (container.to_string(), path.to_string())
}

fn fault_error(op: StoreOp, path: &str) -> WardenError {
    let path = path.to_string();
    let reason = "injected failure".to_string();
    match op {
        StoreOp::AclRead => WardenError::AclRead { path, reason },
        StoreOp::AclWrite => WardenError::AclWrite { path, reason },
        StoreOp::Rename => WardenError::Rename { path, reason },
        StoreOp::Copy => WardenError::Copy { path, reason },
        StoreOp::Delete => WardenError::Delete { path, reason },
        StoreOp::Metadata => WardenError::Metadata { path, reason },
    }
}
