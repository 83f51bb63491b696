// src/commands/mod.rs
//! One command type per cryptographic verb
//!
//! A command holds its inputs from construction and exposes a single
//! [`Command::execute`]. Inputs are read from and outputs written to
//! [`SecureStorage`]; no raw bytes flow between commands. Every log line a
//! command emits carries the operation id as its correlation id.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::aliases::KeyMaterial;
use crate::enums::EncryptionAlgorithm;
use crate::error::{CryptoError, OperationResult, StorageError};
use crate::logging::{LogContext, LogMetadata, SecureLogger};
use crate::storage::SecureStorage;

mod decrypt;
mod derive_key;
mod encrypt;
mod factory;
mod generate_key;
mod hash;
mod transfer;
mod verify_hash;

pub use decrypt::{DecryptCommand, DecryptOptions};
pub use derive_key::{DeriveKeyCommand, DeriveKeyOptions};
pub use encrypt::{EncryptCommand, EncryptOptions};
pub use factory::CommandFactory;
pub use generate_key::{GenerateKeyCommand, GenerateKeyOptions};
pub use hash::{HashCommand, HashOptions};
pub use transfer::{ExportCommand, ImportCommand};
pub use verify_hash::VerifyHashCommand;

/// Uniform contract for every operation
#[async_trait]
pub trait Command: Send + Sync {
    type Output: Send;

    /// Operation name used in log contexts
    const NAME: &'static str;

    async fn execute(
        &self,
        context: &OperationContext,
        operation_id: &str,
    ) -> OperationResult<Self::Output>;
}

/// Caller-side information attached to every log line of an operation
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Who issued the operation, e.g. the engine name
    pub origin: String,
    pub metadata: LogMetadata,
}

impl OperationContext {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            metadata: LogMetadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: LogMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Fresh operation id
pub fn new_operation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Input bytes for a command: a stored blob or bytes supplied inline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Identifier(String),
    Bytes(Vec<u8>),
}

impl DataSource {
    pub fn id(identifier: impl Into<String>) -> Self {
        DataSource::Identifier(identifier.into())
    }

    fn describe(&self, metadata: LogMetadata, key: &str) -> LogMetadata {
        match self {
            DataSource::Identifier(id) => metadata.private(key, id),
            DataSource::Bytes(bytes) => metadata.public(format!("{key}_inline_size"), bytes.len()),
        }
    }
}

impl From<&[u8]> for DataSource {
    fn from(bytes: &[u8]) -> Self {
        DataSource::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for DataSource {
    fn from(bytes: Vec<u8>) -> Self {
        DataSource::Bytes(bytes)
    }
}

/// Cipher algorithms an engine accepts, and the one it picks when the
/// caller names none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmPolicy {
    pub default: EncryptionAlgorithm,
    pub supported: &'static [EncryptionAlgorithm],
}

impl AlgorithmPolicy {
    pub const ALL: AlgorithmPolicy = AlgorithmPolicy {
        default: EncryptionAlgorithm::Aes256Gcm,
        supported: &[
            EncryptionAlgorithm::Aes256Gcm,
            EncryptionAlgorithm::Aes128Gcm,
            EncryptionAlgorithm::ChaCha20Poly1305,
            EncryptionAlgorithm::Aes256Cbc,
        ],
    };

    pub fn resolve(&self, requested: Option<EncryptionAlgorithm>) -> OperationResult<EncryptionAlgorithm> {
        let algorithm = requested.unwrap_or(self.default);
        self.check(algorithm)?;
        Ok(algorithm)
    }

    pub fn check(&self, algorithm: EncryptionAlgorithm) -> OperationResult<()> {
        if self.supported.contains(&algorithm) {
            Ok(())
        } else {
            Err(CryptoError::UnsupportedOperation(format!(
                "{algorithm} is not available on this engine"
            )))
        }
    }
}

impl Default for AlgorithmPolicy {
    fn default() -> Self {
        Self::ALL
    }
}

/// Log lines for a single command execution
pub(crate) struct CommandLog {
    logger: Arc<dyn SecureLogger>,
    context: LogContext,
}

impl CommandLog {
    pub(crate) fn new(
        logger: &Arc<dyn SecureLogger>,
        name: &str,
        operation_id: &str,
        context: &OperationContext,
    ) -> Self {
        let mut log_context = LogContext::new(name, operation_id).with_metadata(&context.metadata);
        if !context.origin.is_empty() {
            log_context = log_context.with_public("origin", &context.origin);
        }
        Self {
            logger: Arc::clone(logger),
            context: log_context,
        }
    }

    fn with(&self, metadata: &LogMetadata) -> LogContext {
        self.context.clone().with_metadata(metadata)
    }

    pub(crate) fn started(&self, metadata: LogMetadata) {
        let message = format!("{} started", self.context.operation);
        self.logger.debug(&message, &self.with(&metadata));
    }

    pub(crate) fn debug(&self, message: &str, metadata: LogMetadata) {
        self.logger.debug(message, &self.with(&metadata));
    }

    pub(crate) fn warning(&self, message: &str, metadata: LogMetadata) {
        self.logger.warning(message, &self.with(&metadata));
    }

    /// Report the outcome and hand it back unchanged
    pub(crate) fn finish<T>(
        &self,
        result: OperationResult<T>,
        describe: impl FnOnce(&T) -> LogMetadata,
    ) -> OperationResult<T> {
        match &result {
            Ok(value) => {
                let message = format!("{} completed", self.context.operation);
                self.logger.info(&message, &self.with(&describe(value)));
            }
            Err(err) => {
                let message = format!("{} failed", self.context.operation);
                let metadata = LogMetadata::new().public("error_kind", err.kind());
                self.logger.error(&message, &self.with(&metadata));
            }
        }
        result
    }
}

/// Read a key; a missing blob is `KeyNotFound`
pub(crate) async fn load_key(storage: &dyn SecureStorage, key_id: &str) -> OperationResult<KeyMaterial> {
    match storage.retrieve(key_id).await {
        Ok(bytes) => Ok(KeyMaterial::from(bytes)),
        Err(StorageError::NotFound(id)) => Err(CryptoError::KeyNotFound(id)),
        Err(err) => Err(err.into()),
    }
}

/// Resolve a data source; a missing blob is `DataNotFound`
pub(crate) async fn load_data(
    storage: &dyn SecureStorage,
    source: &DataSource,
) -> OperationResult<Zeroizing<Vec<u8>>> {
    match source {
        DataSource::Bytes(bytes) => Ok(Zeroizing::new(bytes.clone())),
        DataSource::Identifier(id) => match storage.retrieve(id).await {
            Ok(bytes) => Ok(Zeroizing::new(bytes)),
            Err(StorageError::NotFound(id)) => Err(CryptoError::DataNotFound(id)),
            Err(err) => Err(err.into()),
        },
    }
}

/// Reject an explicitly empty output identifier before any work is done
pub(crate) fn check_target(identifier: Option<&str>) -> OperationResult<()> {
    match identifier {
        Some("") => Err(CryptoError::InvalidInput("identifier must not be empty".into())),
        _ => Ok(()),
    }
}

/// Store under the given identifier, or a fresh UUID; returns the identifier
pub(crate) async fn persist(
    storage: &dyn SecureStorage,
    bytes: &[u8],
    identifier: Option<&str>,
) -> OperationResult<String> {
    check_target(identifier)?;
    let identifier = identifier.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
    storage.store(bytes, &identifier).await?;
    Ok(identifier)
}
