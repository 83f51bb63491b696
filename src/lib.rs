// src/lib.rs
//! crypto-ops: Pluggable cryptographic operations over secure storage
//!
//! Features:
//! - One command per verb: encrypt, decrypt, hash, verify, derive, generate, import, export
//! - Versioned binary envelope with read support for older layouts
//! - PBKDF2 and HKDF key derivation over HMAC-SHA-2
//! - Engine registry with explicit selection and lazily bound engines
//! - Privacy-tiered logging and zeroizing secret wrappers

pub mod aliases;
pub mod commands;
pub mod config;
pub mod consts;
pub mod engine;
pub mod enums;
pub mod format;
pub mod kdf;
pub mod keys;
pub mod logging;
pub mod primitives;
pub mod services;
pub mod storage;

pub mod error;

// Re-export everything users need at the crate root
pub use aliases::{KeyMaterial, PlainText};
pub use commands::{Command, CommandFactory, DataSource, OperationContext};
pub use config::load as load_config;
pub use config::CryptoConfig;
pub use engine::{CryptoEngine, EngineProxy, EngineRegistry, ProxyState};
pub use enums::{EncryptionAlgorithm, EngineType, HashAlgorithm, KdfAlgorithm, KeyType};
pub use error::{CryptoError, ErrorKind, OperationResult, StorageError};
pub use keys::{DerivedKey, KeyDescriptor};
pub use logging::{SecureLogger, TracingLogger};
pub use services::CryptoServices;
pub use storage::{MemoryStorage, SecureStorage, SqliteStorage};
