// src/commands/generate_key.rs
use async_trait::async_trait;

use super::{check_target, persist, Command, CommandLog, OperationContext};
use crate::aliases::ExposeSecret;
use crate::enums::KeyType;
use crate::error::OperationResult;
use crate::keys::{generate_key_material, KeyDescriptor};
use crate::logging::LogMetadata;
use crate::primitives::guarded;
use crate::services::CryptoServices;

#[derive(Debug, Clone)]
pub struct GenerateKeyOptions {
    pub key_type: KeyType,
    /// Byte length; must match fixed-size key types exactly
    pub length: Option<usize>,
    pub identifier: Option<String>,
}

impl GenerateKeyOptions {
    pub fn new(key_type: KeyType) -> Self {
        Self {
            key_type,
            length: None,
            identifier: None,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

/// Generate random key bytes and store them
pub struct GenerateKeyCommand {
    services: CryptoServices,
    options: GenerateKeyOptions,
}

impl GenerateKeyCommand {
    pub fn new(services: CryptoServices, options: GenerateKeyOptions) -> Self {
        Self { services, options }
    }

    async fn run(&self) -> OperationResult<KeyDescriptor> {
        check_target(self.options.identifier.as_deref())?;
        let key_type = self.options.key_type;
        let material = guarded("generate_key", key_type, || {
            generate_key_material(key_type, self.options.length)
        })?;
        let bytes = &material.expose_secret()[..];
        let identifier = persist(
            self.services.storage.as_ref(),
            bytes,
            self.options.identifier.as_deref(),
        )
        .await?;
        Ok(KeyDescriptor::new(identifier, key_type, bytes.len()))
    }
}

#[async_trait]
impl Command for GenerateKeyCommand {
    type Output = KeyDescriptor;
    const NAME: &'static str = "generate_key";

    async fn execute(&self, context: &OperationContext, operation_id: &str) -> OperationResult<KeyDescriptor> {
        let log = CommandLog::new(&self.services.logger, Self::NAME, operation_id, context);
        let mut metadata = LogMetadata::new().public("key_type", self.options.key_type);
        if let Some(length) = self.options.length {
            metadata = metadata.public("length", length);
        }
        log.started(metadata);
        let result = self.run().await;
        log.finish(result, |descriptor| {
            LogMetadata::new()
                .private("key_id", &descriptor.identifier)
                .public("bit_length", descriptor.bit_length)
        })
    }
}
