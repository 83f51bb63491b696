// src/engine/mod.rs
//! Interchangeable cryptographic engines and their selection
//!
//! Callers pick an engine with an explicit [`EngineType`] through the
//! [`EngineRegistry`]. The registry hands back an [`EngineProxy`] at once;
//! the concrete engine is built on first use by an [`EngineLoader`], and an
//! engine type with no linked implementation binds the [`FallbackEngine`].

use async_trait::async_trait;

use crate::aliases::PlainText;
use crate::commands::{
    DataSource, DecryptOptions, DeriveKeyOptions, EncryptOptions, GenerateKeyOptions, HashOptions,
};
use crate::enums::{EngineType, ExportEncoding};
use crate::error::{CryptoError, OperationResult, StorageError};
use crate::keys::{DerivedKey, KeyDescriptor};
use crate::logging::LogContext;
use crate::services::CryptoServices;

mod command_engine;
mod fallback;
mod loader;
mod proxy;
mod registry;

pub use command_engine::{CommandEngine, EngineProfile, Portable, PortableEngine, Standard, StandardEngine};
pub use fallback::{FallbackEngine, FALLBACK_TAG};
pub use proxy::{EngineProxy, ProxyState};
pub use loader::BuiltinEngineLoader;
pub use registry::{EngineLoader, EngineRegistry};

/// Full operation set every engine implements
#[async_trait]
pub trait CryptoEngine: Send + Sync {
    /// Engine type this instance serves
    fn engine_type(&self) -> EngineType;

    /// True for the stand-in bound when no implementation is linked
    fn is_fallback(&self) -> bool {
        false
    }

    /// Returns the identifier of the stored envelope
    async fn encrypt(
        &self,
        plaintext: DataSource,
        key_id: &str,
        options: EncryptOptions,
    ) -> OperationResult<String>;

    async fn decrypt(&self, envelope_id: &str, options: DecryptOptions) -> OperationResult<PlainText>;

    async fn hash(&self, data: DataSource, options: HashOptions) -> OperationResult<Vec<u8>>;

    async fn verify_hash(
        &self,
        data: DataSource,
        expected: &[u8],
        options: HashOptions,
    ) -> OperationResult<bool>;

    async fn derive_key(
        &self,
        source_key_id: &str,
        options: DeriveKeyOptions,
    ) -> OperationResult<DerivedKey>;

    async fn generate_key(&self, options: GenerateKeyOptions) -> OperationResult<KeyDescriptor>;

    async fn import_data(&self, data: Vec<u8>, identifier: Option<String>) -> OperationResult<String>;

    async fn export_data(&self, identifier: &str, encoding: ExportEncoding) -> OperationResult<Vec<u8>>;

    async fn store_data(&self, data: &[u8], identifier: &str) -> OperationResult<()>;

    async fn retrieve_data(&self, identifier: &str) -> OperationResult<Vec<u8>>;

    async fn delete_data(&self, identifier: &str) -> OperationResult<()>;
}

fn not_found_as_data(err: StorageError) -> CryptoError {
    match err {
        StorageError::NotFound(id) => CryptoError::DataNotFound(id),
        other => other.into(),
    }
}

/// Raw storage verbs shared by every engine
pub(crate) struct StoragePassThrough<'a> {
    services: &'a CryptoServices,
    engine: &'a str,
}

impl<'a> StoragePassThrough<'a> {
    pub(crate) fn new(services: &'a CryptoServices, engine: &'a str) -> Self {
        Self { services, engine }
    }

    fn trace(&self, operation: &str, identifier: &str) {
        let context = LogContext::new(operation, crate::commands::new_operation_id())
            .with_public("engine", self.engine)
            .with_private("identifier", identifier);
        self.services.logger.debug("storage pass-through", &context);
    }

    pub(crate) async fn store(&self, data: &[u8], identifier: &str) -> OperationResult<()> {
        if identifier.is_empty() {
            return Err(CryptoError::InvalidInput("identifier is required".into()));
        }
        self.trace("store_data", identifier);
        Ok(self.services.storage.store(data, identifier).await?)
    }

    pub(crate) async fn retrieve(&self, identifier: &str) -> OperationResult<Vec<u8>> {
        self.trace("retrieve_data", identifier);
        self.services
            .storage
            .retrieve(identifier)
            .await
            .map_err(not_found_as_data)
    }

    pub(crate) async fn delete(&self, identifier: &str) -> OperationResult<()> {
        self.trace("delete_data", identifier);
        self.services
            .storage
            .delete(identifier)
            .await
            .map_err(not_found_as_data)
    }
}
