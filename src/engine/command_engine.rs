// src/engine/command_engine.rs
//! Engines that run every verb through the command layer
//!
//! The engine families differ only in which cipher algorithms they accept
//! and which one they pick by default; that difference lives in an
//! [`EngineProfile`] marker type.

use std::marker::PhantomData;

use async_trait::async_trait;

use super::{CryptoEngine, StoragePassThrough};
use crate::aliases::PlainText;
use crate::commands::{
    new_operation_id, AlgorithmPolicy, Command, CommandFactory, DataSource, DecryptOptions,
    DeriveKeyOptions, EncryptOptions, GenerateKeyOptions, HashOptions, OperationContext,
};
use crate::enums::{EncryptionAlgorithm, EngineType, ExportEncoding};
use crate::error::OperationResult;
use crate::keys::{DerivedKey, KeyDescriptor};
use crate::services::CryptoServices;

pub trait EngineProfile: Send + Sync + 'static {
    const ENGINE_TYPE: EngineType;
    const ALGORITHMS: AlgorithmPolicy;
}

/// General-purpose software engine
#[derive(Debug, Clone, Copy)]
pub struct Standard;

impl EngineProfile for Standard {
    const ENGINE_TYPE: EngineType = EngineType::Standard;
    const ALGORITHMS: AlgorithmPolicy = AlgorithmPolicy::ALL;
}

/// Cross-platform engine limited to constant-time software ciphers
#[derive(Debug, Clone, Copy)]
pub struct Portable;

impl EngineProfile for Portable {
    const ENGINE_TYPE: EngineType = EngineType::Portable;
    const ALGORITHMS: AlgorithmPolicy = AlgorithmPolicy {
        default: EncryptionAlgorithm::ChaCha20Poly1305,
        supported: &[
            EncryptionAlgorithm::ChaCha20Poly1305,
            EncryptionAlgorithm::Aes256Gcm,
        ],
    };
}

pub type StandardEngine = CommandEngine<Standard>;
pub type PortableEngine = CommandEngine<Portable>;

pub struct CommandEngine<P: EngineProfile> {
    factory: CommandFactory,
    context: OperationContext,
    name: String,
    _profile: PhantomData<fn() -> P>,
}

impl<P: EngineProfile> CommandEngine<P> {
    pub fn new(services: CryptoServices) -> Self {
        let name = P::ENGINE_TYPE.to_string();
        Self {
            factory: CommandFactory::new(services).with_algorithms(P::ALGORITHMS),
            context: OperationContext::new(name.as_str()),
            name,
            _profile: PhantomData,
        }
    }

    pub fn factory(&self) -> &CommandFactory {
        &self.factory
    }

    async fn run<C: Command>(&self, command: C) -> OperationResult<C::Output> {
        command.execute(&self.context, &new_operation_id()).await
    }

    fn storage(&self) -> StoragePassThrough<'_> {
        StoragePassThrough::new(self.factory.services(), &self.name)
    }
}

#[async_trait]
impl<P: EngineProfile> CryptoEngine for CommandEngine<P> {
    fn engine_type(&self) -> EngineType {
        P::ENGINE_TYPE
    }

    async fn encrypt(
        &self,
        plaintext: DataSource,
        key_id: &str,
        options: EncryptOptions,
    ) -> OperationResult<String> {
        self.run(self.factory.encrypt(plaintext, key_id, options)).await
    }

    async fn decrypt(&self, envelope_id: &str, options: DecryptOptions) -> OperationResult<PlainText> {
        self.run(self.factory.decrypt(envelope_id, options)).await
    }

    async fn hash(&self, data: DataSource, options: HashOptions) -> OperationResult<Vec<u8>> {
        self.run(self.factory.hash(data, options)).await
    }

    async fn verify_hash(
        &self,
        data: DataSource,
        expected: &[u8],
        options: HashOptions,
    ) -> OperationResult<bool> {
        self.run(self.factory.verify_hash(data, expected, options)).await
    }

    async fn derive_key(
        &self,
        source_key_id: &str,
        options: DeriveKeyOptions,
    ) -> OperationResult<DerivedKey> {
        self.run(self.factory.derive_key(source_key_id, options)).await
    }

    async fn generate_key(&self, options: GenerateKeyOptions) -> OperationResult<KeyDescriptor> {
        self.run(self.factory.generate_key(options)).await
    }

    async fn import_data(&self, data: Vec<u8>, identifier: Option<String>) -> OperationResult<String> {
        self.run(self.factory.import(data, identifier)).await
    }

    async fn export_data(&self, identifier: &str, encoding: ExportEncoding) -> OperationResult<Vec<u8>> {
        self.run(self.factory.export(identifier, encoding)).await
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
