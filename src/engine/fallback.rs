// src/engine/fallback.rs
//! Stand-in bound when the requested engine has no implementation
//!
//! Every cryptographic verb fails with `OperationNotImplemented` and logs a
//! warning tagged `fallback implementation`. Storage verbs still work.

use async_trait::async_trait;

use super::{CryptoEngine, StoragePassThrough};
use crate::aliases::PlainText;
use crate::commands::{
    new_operation_id, Command, CommandFactory, DataSource, DecryptOptions, DeriveKeyOptions,
    EncryptOptions, GenerateKeyOptions, HashOptions, OperationContext,
};
use crate::enums::{EngineType, ExportEncoding};
use crate::error::{CryptoError, OperationResult};
use crate::keys::{DerivedKey, KeyDescriptor};
use crate::logging::LogContext;
use crate::services::CryptoServices;

pub const FALLBACK_TAG: &str = "fallback implementation";

pub struct FallbackEngine {
    requested: EngineType,
    factory: CommandFactory,
    context: OperationContext,
    name: String,
}

impl FallbackEngine {
    pub fn new(requested: EngineType, services: CryptoServices) -> Self {
        let name = format!("{requested} ({FALLBACK_TAG})");
        Self {
            requested,
            factory: CommandFactory::new(services),
            context: OperationContext::new(name.as_str()),
            name,
        }
    }

    fn refuse<T>(&self, operation: &str) -> OperationResult<T> {
        let context = LogContext::new(operation, new_operation_id())
            .with_public("engine", self.requested)
            .with_public("implementation", FALLBACK_TAG);
        self.factory.services().logger.warning(
            &format!("{FALLBACK_TAG}: {operation} is not available"),
            &context,
        );
        Err(CryptoError::OperationNotImplemented {
            engine: self.name.clone(),
            operation: operation.to_string(),
        })
    }

    fn storage(&self) -> StoragePassThrough<'_> {
        StoragePassThrough::new(self.factory.services(), &self.name)
    }
}

#[async_trait]
impl CryptoEngine for FallbackEngine {
    fn engine_type(&self) -> EngineType {
        self.requested
    }

    fn is_fallback(&self) -> bool {
        true
    }

    async fn encrypt(
        &self,
        _plaintext: DataSource,
        _key_id: &str,
        _options: EncryptOptions,
    ) -> OperationResult<String> {
        self.refuse("encrypt")
    }

    async fn decrypt(&self, _envelope_id: &str, _options: DecryptOptions) -> OperationResult<PlainText> {
        self.refuse("decrypt")
    }

    async fn hash(&self, _data: DataSource, _options: HashOptions) -> OperationResult<Vec<u8>> {
        self.refuse("hash")
    }

    async fn verify_hash(
        &self,
        _data: DataSource,
        _expected: &[u8],
        _options: HashOptions,
    ) -> OperationResult<bool> {
        self.refuse("verify_hash")
    }

    async fn derive_key(
        &self,
        _source_key_id: &str,
        _options: DeriveKeyOptions,
    ) -> OperationResult<DerivedKey> {
        self.refuse("derive_key")
    }

    async fn generate_key(&self, _options: GenerateKeyOptions) -> OperationResult<KeyDescriptor> {
        self.refuse("generate_key")
    }

    async fn import_data(&self, data: Vec<u8>, identifier: Option<String>) -> OperationResult<String> {
        self.factory
            .import(data, identifier)
            .execute(&self.context, &new_operation_id())
            .await
    }

    async fn export_data(&self, identifier: &str, encoding: ExportEncoding) -> OperationResult<Vec<u8>> {
        self.factory
            .export(identifier, encoding)
            .execute(&self.context, &new_operation_id())
            .await
    }

    async fn store_data(&self, data: &[u8], identifier: &str) -> OperationResult<()> {
        self.storage().store(data, identifier).await
    }

    async fn retrieve_data(&self, identifier: &str) -> OperationResult<Vec<u8>> {
        self.storage().retrieve(identifier).await
    }

    async fn delete_data(&self, identifier: &str) -> OperationResult<()> {
        self.storage().delete(identifier).await
    }
}
