// tests/storage_tests.rs
use std::sync::Arc;

use crypto_ops::config::{StorageBackend, StorageSettings};
use crypto_ops::error::StorageError;
use crypto_ops::storage::{self, MemoryStorage, SecureStorage, SqliteStorage};
use tempfile::tempdir;

async fn exercise(store: &dyn SecureStorage) {
    store.store(b"first", "blob").await.unwrap();
    assert_eq!(store.retrieve("blob").await.unwrap(), b"first");

    // writes overwrite unconditionally
    store.store(b"second", "blob").await.unwrap();
    assert_eq!(store.retrieve("blob").await.unwrap(), b"second");

    store.delete("blob").await.unwrap();
    assert_eq!(
        store.retrieve("blob").await,
        Err(StorageError::NotFound("blob".into()))
    );
    assert_eq!(
        store.delete("blob").await,
        Err(StorageError::NotFound("blob".into()))
    );
}

#[tokio::test]
async fn test_memory_storage_contract() {
    exercise(&MemoryStorage::new()).await;
}

#[tokio::test]
async fn test_sqlite_storage_contract() {
    let dir = tempdir().unwrap();
    let store = SqliteStorage::open(dir.path().join("nested").join("store.db")).unwrap();
    exercise(&store).await;
}

#[tokio::test]
async fn test_sqlite_storage_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.db");
    {
        let store = SqliteStorage::open(&path).unwrap();
        store.store(&[1, 2, 3], "kept").await.unwrap();
    }
    let reopened = SqliteStorage::open(&path).unwrap();
    assert_eq!(reopened.retrieve("kept").await.unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_sqlite_in_memory_handles_empty_blobs() {
    let store = SqliteStorage::open_in_memory().unwrap();
    store.store(&[], "empty").await.unwrap();
    assert!(store.retrieve("empty").await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_to_distinct_identifiers() {
    let store: Arc<dyn SecureStorage> = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let mut handles = Vec::new();
    for i in 0..32u8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.store(&[i; 8], &format!("id-{i}")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    for i in 0..32u8 {
        assert_eq!(store.retrieve(&format!("id-{i}")).await.unwrap(), vec![i; 8]);
    }
}

#[tokio::test]
async fn test_open_builds_configured_backend() {
    let dir = tempdir().unwrap();
    let settings = StorageSettings {
        backend: StorageBackend::Sqlite,
        sqlite_path: Some(dir.path().join("configured.db")),
    };
    let store = storage::open(&settings).unwrap();
    store.store(b"x", "y").await.unwrap();
    assert!(dir.path().join("configured.db").exists());
}
