// src/commands/encrypt.rs
use async_trait::async_trait;

use super::{
    check_target, load_data, load_key, persist, AlgorithmPolicy, Command, CommandLog, DataSource,
    OperationContext,
};
use crate::aliases::ExposeSecret;
use crate::enums::EncryptionAlgorithm;
use crate::error::{CryptoError, OperationResult};
use crate::format::{self, Envelope};
use crate::logging::LogMetadata;
use crate::primitives::{self, guarded};
use crate::services::CryptoServices;

#[derive(Debug, Clone, Default)]
pub struct EncryptOptions {
    /// `None` picks the engine default
    pub algorithm: Option<EncryptionAlgorithm>,
    /// Explicit IV/nonce; a random one is generated when absent
    pub iv: Option<Vec<u8>>,
    /// Where to store the envelope; a fresh UUID when absent
    pub output_id: Option<String>,
    /// Record the key identifier inside the envelope
    pub embed_key_reference: bool,
}

impl EncryptOptions {
    pub fn with_algorithm(algorithm: EncryptionAlgorithm) -> Self {
        Self {
            algorithm: Some(algorithm),
            ..Self::default()
        }
    }
}

/// Seal plaintext under a stored key and store the envelope
pub struct EncryptCommand {
    services: CryptoServices,
    algorithms: AlgorithmPolicy,
    plaintext: DataSource,
    key_id: String,
    options: EncryptOptions,
}

impl EncryptCommand {
    pub fn new(
        services: CryptoServices,
        algorithms: AlgorithmPolicy,
        plaintext: DataSource,
        key_id: impl Into<String>,
        options: EncryptOptions,
    ) -> Self {
        Self {
            services,
            algorithms,
            plaintext,
            key_id: key_id.into(),
            options,
        }
    }

    fn validate(&self) -> OperationResult<EncryptionAlgorithm> {
        let algorithm = self.algorithms.resolve(self.options.algorithm)?;
        if self.key_id.is_empty() {
            return Err(CryptoError::InvalidInput("key identifier is required".into()));
        }
        if self.options.embed_key_reference && self.key_id.len() > u8::MAX as usize {
            return Err(CryptoError::InvalidInput(format!(
                "embedded key reference must be at most 255 bytes, got {}",
                self.key_id.len()
            )));
        }
        if let Some(iv) = &self.options.iv {
            if iv.len() != algorithm.iv_len() {
                return Err(CryptoError::InvalidInput(format!(
                    "{algorithm} needs a {}-byte IV, got {}",
                    algorithm.iv_len(),
                    iv.len()
                )));
            }
        }
        check_target(self.options.output_id.as_deref())?;
        Ok(algorithm)
    }

    async fn run(&self, log: &CommandLog) -> OperationResult<String> {
        let algorithm = self.validate()?;
        let storage = self.services.storage.as_ref();

        let plaintext = load_data(storage, &self.plaintext).await?;
        let key = load_key(storage, &self.key_id).await?;
        let key = &key.expose_secret()[..];
        if key.len() != algorithm.key_len() {
            return Err(CryptoError::key_size(algorithm, algorithm.key_len(), key.len()));
        }

        log.debug(
            "sealing",
            LogMetadata::new()
                .public("algorithm", algorithm)
                .public("plaintext_size", plaintext.len()),
        );

        let iv = match &self.options.iv {
            Some(iv) => iv.clone(),
            None => primitives::random_iv(algorithm),
        };
        let sealed = guarded("encrypt", algorithm, || {
            primitives::seal(algorithm, key, &iv, &plaintext)
        })?;

        let mut envelope = Envelope::new(algorithm, iv, sealed.ciphertext, sealed.tag);
        if self.options.embed_key_reference {
            envelope = envelope.with_key_reference(self.key_id.as_str());
        }
        let blob = format::pack(&envelope)?;
        persist(storage, &blob, self.options.output_id.as_deref()).await
    }
}

#[async_trait]
impl Command for EncryptCommand {
    type Output = String;
    const NAME: &'static str = "encrypt";

    async fn execute(&self, context: &OperationContext, operation_id: &str) -> OperationResult<String> {
        let log = CommandLog::new(&self.services.logger, Self::NAME, operation_id, context);
        log.started(
            self.plaintext
                .describe(LogMetadata::new(), "plaintext_id")
                .private("key_id", &self.key_id),
        );
        let result = self.run(&log).await;
        log.finish(result, |id| LogMetadata::new().private("envelope_id", id))
    }
}
