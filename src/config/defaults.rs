// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{HashSettings, KdfSettings, StorageBackend, StorageSettings};
use crate::consts::{DEFAULT_KDF_ITERATIONS, DEFAULT_SALT_SIZE, MIN_KDF_ITERATIONS};
use crate::enums::{HashAlgorithm, KdfAlgorithm};

pub const DEFAULT_STORE_DIR: &str = "crypto-ops";
pub const DEFAULT_STORE_FILE: &str = "secure-store.db";

pub fn default_kdf() -> KdfSettings {
    KdfSettings {
        default_algorithm: KdfAlgorithm::HkdfSha256,
        iterations: DEFAULT_KDF_ITERATIONS,
        min_iterations: MIN_KDF_ITERATIONS,
        allow_below_minimum: false,
        salt_length: DEFAULT_SALT_SIZE,
    }
}

pub fn default_hashing() -> HashSettings {
    HashSettings {
        fallback_algorithm: HashAlgorithm::Sha256,
    }
}

pub fn default_storage() -> StorageSettings {
    StorageSettings {
        backend: StorageBackend::Memory,
        sqlite_path: None,
    }
}

/// `<data dir>/crypto-ops/secure-store.db`, or a relative path when the
/// platform reports no data directory
pub fn default_sqlite_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DEFAULT_STORE_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
        .join(DEFAULT_STORE_FILE)
}
