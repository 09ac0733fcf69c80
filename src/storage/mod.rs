//! Configuration storage subsystem.
//!
//! # Data Flow
//! ```text
//! operator edits (files, API)
//!     → ConfigStore (versioned objects by name)
//!     → watcher.rs (snapshot stream + error stream)
//!     → event loop
//!
//! Reconciliation writes back:
//!     schema update (resolver map reference)
//!     resolver map create (generated skeleton)
//!     status updates (reports)
//! ```
//!
//! # Design Decisions
//! - Writes are per-object, never transactional across objects
//! - Optimistic concurrency via `resource_version`
//! - Not-found, already-exists and conflict are distinct errors

pub mod file;
pub mod memory;
pub mod watcher;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ObjectKind, ResolverMap, Schema, Snapshot};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use watcher::{poll_store, DirectoryWatcher, WatchError, WatchHandle, WatchSender};

/// Errors surfaced by a storage backend.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("{kind} {name} not found")]
    NotFound { kind: ObjectKind, name: String },

    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: ObjectKind, name: String },

    #[error("{kind} {name} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        kind: ObjectKind,
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("invalid {kind} name: {reason}")]
    InvalidName { kind: ObjectKind, reason: String },

    #[error("{path}: document declares name {declared}, expected {expected}")]
    NameMismatch {
        path: String,
        declared: String,
        expected: String,
    },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    /// True for both stale updates and duplicate creates.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StorageError::Conflict { .. } | StorageError::AlreadyExists { .. }
        )
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Client for the configuration storage backend.
///
/// `update_*` requires the caller's `resource_version` to match the stored
/// one and returns the object with its new version.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_schema(&self, name: &str) -> StorageResult<Schema>;
    async fn update_schema(&self, schema: Schema) -> StorageResult<Schema>;
    async fn list_schemas(&self) -> StorageResult<Vec<Schema>>;

    async fn get_resolver_map(&self, name: &str) -> StorageResult<ResolverMap>;
    async fn create_resolver_map(&self, resolver_map: ResolverMap) -> StorageResult<ResolverMap>;
    async fn update_resolver_map(&self, resolver_map: ResolverMap) -> StorageResult<ResolverMap>;
    async fn list_resolver_maps(&self) -> StorageResult<Vec<ResolverMap>>;

    /// Read the whole configuration set.
    async fn snapshot(&self) -> StorageResult<Snapshot> {
        Ok(Snapshot::new(
            self.list_schemas().await?,
            self.list_resolver_maps().await?,
        ))
    }
}

pub(crate) fn check_name(kind: ObjectKind, name: &str) -> StorageResult<()> {
    crate::model::validate_name(name).map_err(|reason| StorageError::InvalidName { kind, reason })
}
