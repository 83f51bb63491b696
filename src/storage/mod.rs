// src/storage/mod.rs
//! Secure storage boundary
//!
//! Commands read their inputs and write their outputs through
//! [`SecureStorage`]; no raw bytes flow between commands. Writes overwrite
//! unconditionally and nothing is deleted implicitly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{defaults::default_sqlite_path, StorageBackend, StorageSettings};
use crate::error::StorageError;

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Opaque byte-blob store addressed by string identifier
///
/// Implementations must be safe under concurrent access.
#[async_trait]
pub trait SecureStorage: Send + Sync {
    async fn store(&self, data: &[u8], identifier: &str) -> Result<(), StorageError>;

    async fn retrieve(&self, identifier: &str) -> Result<Vec<u8>, StorageError>;

    async fn delete(&self, identifier: &str) -> Result<(), StorageError>;
}

/// Build the backend named in the config
pub fn open(settings: &StorageSettings) -> Result<Arc<dyn SecureStorage>, StorageError> {
    match settings.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::Sqlite => {
            let path = settings
                .sqlite_path
                .clone()
                .unwrap_or_else(default_sqlite_path);
            Ok(Arc::new(SqliteStorage::open(path)?))
        }
    }
}
