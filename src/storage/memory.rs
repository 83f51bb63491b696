// src/storage/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use zeroize::Zeroizing;

use super::SecureStorage;
use crate::error::StorageError;

/// In-process store; values are zeroized when overwritten or dropped
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, Zeroizing<Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.blobs.read().contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

#[async_trait]
impl SecureStorage for MemoryStorage {
    async fn store(&self, data: &[u8], identifier: &str) -> Result<(), StorageError> {
        self.blobs
            .write()
            .insert(identifier.to_string(), Zeroizing::new(data.to_vec()));
        Ok(())
    }

    async fn retrieve(&self, identifier: &str) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .read()
            .get(identifier)
            .map(|blob| blob.to_vec())
            .ok_or_else(|| StorageError::NotFound(identifier.to_string()))
    }

    async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
        self.blobs
            .write()
            .remove(identifier)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(identifier.to_string()))
    }
}
