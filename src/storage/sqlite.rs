// src/storage/sqlite.rs
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::SecureStorage;
use crate::error::StorageError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS secure_blobs (
        identifier TEXT PRIMARY KEY,
        blob       BLOB NOT NULL,
        stored_at  TEXT NOT NULL
    );
"#;

/// SQLite-backed store; each call runs on the blocking thread pool
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        if let Some(parent) = path.as_ref().parent() {
            let _ = fs::create_dir_all(parent);
        }
        Self::init(Connection::open(path.as_ref())?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl SecureStorage for SqliteStorage {
    async fn store(&self, data: &[u8], identifier: &str) -> Result<(), StorageError> {
        let data = data.to_vec();
        let identifier = identifier.to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO secure_blobs (identifier, blob, stored_at)
                 VALUES (?1, ?2, datetime('now'))",
                params![identifier, data],
            )?;
            Ok(())
        })
        .await
    }

    async fn retrieve(&self, identifier: &str) -> Result<Vec<u8>, StorageError> {
        let identifier = identifier.to_string();
        self.run(move |conn| {
            conn.query_row(
                "SELECT blob FROM secure_blobs WHERE identifier = ?1",
                [&identifier],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?
            .ok_or(StorageError::NotFound(identifier))
        })
        .await
    }

    async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
        let identifier = identifier.to_string();
        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM secure_blobs WHERE identifier = ?1",
                [&identifier],
            )?;
            if removed == 0 {
                return Err(StorageError::NotFound(identifier));
            }
            Ok(())
        })
        .await
    }
}
