// src/engine/proxy.rs
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::{CryptoEngine, EngineLoader, FallbackEngine, FALLBACK_TAG};
use crate::aliases::PlainText;
use crate::commands::{
    new_operation_id, DataSource, DecryptOptions, DeriveKeyOptions, EncryptOptions,
    GenerateKeyOptions, HashOptions,
};
use crate::enums::{EngineType, ExportEncoding};
use crate::error::OperationResult;
use crate::keys::{DerivedKey, KeyDescriptor};
use crate::logging::LogContext;
use crate::services::CryptoServices;

/// Where a proxy is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    /// No call has reached the proxy yet
    Deferred,
    /// Delegating to a real engine of this type
    Bound(EngineType),
    /// Delegating to the fallback engine
    Fallback,
}

/// Engine handle returned by the registry before any engine exists
///
/// The first call builds the delegate through the loader; concurrent first
/// callers wait on that one construction. The delegate is then reused for
/// the proxy's lifetime.
pub struct EngineProxy {
    requested: EngineType,
    services: CryptoServices,
    loader: Arc<dyn EngineLoader>,
    delegate: OnceCell<Arc<dyn CryptoEngine>>,
}

impl EngineProxy {
    pub(crate) fn new(
        requested: EngineType,
        services: CryptoServices,
        loader: Arc<dyn EngineLoader>,
    ) -> Self {
        Self {
            requested,
            services,
            loader,
            delegate: OnceCell::new(),
        }
    }

    pub fn requested(&self) -> EngineType {
        self.requested
    }

    pub fn state(&self) -> ProxyState {
        match self.delegate.get() {
            None => ProxyState::Deferred,
            Some(engine) if engine.is_fallback() => ProxyState::Fallback,
            Some(engine) => ProxyState::Bound(engine.engine_type()),
        }
    }

    /// Build the delegate if needed and return it
    pub async fn resolve(&self) -> Arc<dyn CryptoEngine> {
        Arc::clone(self.delegate.get_or_init(|| self.construct()).await)
    }

    async fn construct(&self) -> Arc<dyn CryptoEngine> {
        let context = LogContext::new("engine_bind", new_operation_id())
            .with_public("engine", self.requested);
        match self.loader.load(self.requested, &self.services).await {
            Some(engine) => {
                self.services.logger.debug("engine bound", &context);
                engine
            }
            None => {
                self.services.logger.warning(
                    &format!("no {} engine linked, binding {FALLBACK_TAG}", self.requested),
                    &context.with_public("implementation", FALLBACK_TAG),
                );
                Arc::new(FallbackEngine::new(self.requested, self.services.clone()))
            }
        }
    }
}

#[async_trait]
impl CryptoEngine for EngineProxy {
    fn engine_type(&self) -> EngineType {
        self.requested
    }

    fn is_fallback(&self) -> bool {
        self.state() == ProxyState::Fallback
    }

    async fn encrypt(
        &self,
        plaintext: DataSource,
        key_id: &str,
        options: EncryptOptions,
    ) -> OperationResult<String> {
        self.resolve().await.encrypt(plaintext, key_id, options).await
    }

    async fn decrypt(&self, envelope_id: &str, options: DecryptOptions) -> OperationResult<PlainText> {
        self.resolve().await.decrypt(envelope_id, options).await
    }

    async fn hash(&self, data: DataSource, options: HashOptions) -> OperationResult<Vec<u8>> {
        self.resolve().await.hash(data, options).await
    }

    async fn verify_hash(
        &self,
        data: DataSource,
        expected: &[u8],
        options: HashOptions,
    ) -> OperationResult<bool> {
        self.resolve().await.verify_hash(data, expected, options).await
    }

    async fn derive_key(
        &self,
        source_key_id: &str,
        options: DeriveKeyOptions,
    ) -> OperationResult<DerivedKey> {
        self.resolve().await.derive_key(source_key_id, options).await
    }

    async fn generate_key(&self, options: GenerateKeyOptions) -> OperationResult<KeyDescriptor> {
        self.resolve().await.generate_key(options).await
    }

    async fn import_data(&self, data: Vec<u8>, identifier: Option<String>) -> OperationResult<String> {
        self.resolve().await.import_data(data, identifier).await
    }

    async fn export_data(&self, identifier: &str, encoding: ExportEncoding) -> OperationResult<Vec<u8>> {
        self.resolve().await.export_data(identifier, encoding).await
    }

    async fn store_data(&self, data: &[u8], identifier: &str) -> OperationResult<()> {
        self.resolve().await.store_data(data, identifier).await
    }

    async fn retrieve_data(&self, identifier: &str) -> OperationResult<Vec<u8>> {
        self.resolve().await.retrieve_data(identifier).await
    }

    async fn delete_data(&self, identifier: &str) -> OperationResult<()> {
        self.resolve().await.delete_data(identifier).await
    }
}
