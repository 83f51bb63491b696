// src/commands/derive_key.rs
use async_trait::async_trait;

use super::{check_target, load_key, persist, Command, CommandLog, OperationContext};
use crate::aliases::ExposeSecret;
use crate::enums::{KdfAlgorithm, KeyType};
use crate::error::{CryptoError, OperationResult};
use crate::kdf::{derive_key_material, validate_key_length, DerivationParams};
use crate::keys::{DerivedKey, KeyDescriptor};
use crate::logging::LogMetadata;
use crate::primitives::guarded;
use crate::services::CryptoServices;

#[derive(Debug, Clone)]
pub struct DeriveKeyOptions {
    pub key_type: KeyType,
    /// Reuse a salt returned by an earlier derivation; generated when absent
    pub salt: Option<Vec<u8>>,
    /// Context binding for HKDF; ignored by PBKDF2
    pub info: Vec<u8>,
    /// `None` uses the configured default
    pub kdf: Option<KdfAlgorithm>,
    /// `None` uses the configured iteration count
    pub iterations: Option<u32>,
    /// `None` uses the key type's default length
    pub length: Option<usize>,
    pub target_id: Option<String>,
}

impl DeriveKeyOptions {
    pub fn new(key_type: KeyType) -> Self {
        Self {
            key_type,
            salt: None,
            info: Vec::new(),
            kdf: None,
            iterations: None,
            length: None,
            target_id: None,
        }
    }

    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<Vec<u8>>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_kdf(mut self, kdf: KdfAlgorithm) -> Self {
        self.kdf = Some(kdf);
        self
    }
}

/// Derive a symmetric key from a stored secret and store the result
pub struct DeriveKeyCommand {
    services: CryptoServices,
    source_key_id: String,
    options: DeriveKeyOptions,
}

impl DeriveKeyCommand {
    pub fn new(
        services: CryptoServices,
        source_key_id: impl Into<String>,
        options: DeriveKeyOptions,
    ) -> Self {
        Self {
            services,
            source_key_id: source_key_id.into(),
            options,
        }
    }

    async fn run(&self, log: &CommandLog) -> OperationResult<DerivedKey> {
        let key_type = self.options.key_type;
        if key_type.is_asymmetric() {
            return Err(CryptoError::UnsupportedOperation(format!(
                "cannot derive {key_type} keys"
            )));
        }
        if self.source_key_id.is_empty() {
            return Err(CryptoError::InvalidInput("source key identifier is required".into()));
        }
        if matches!(self.options.salt.as_deref(), Some([])) {
            return Err(CryptoError::InvalidInput("salt must not be empty".into()));
        }
        let length = self.options.length.unwrap_or_else(|| key_type.default_len());
        validate_key_length(key_type, length)?;
        check_target(self.options.target_id.as_deref())?;

        let settings = &self.services.config.kdf;
        let algorithm = self.options.kdf.unwrap_or(settings.default_algorithm);
        let params = DerivationParams {
            algorithm,
            salt: self.options.salt.as_deref(),
            salt_length: settings.salt_length,
            info: &self.options.info,
            iterations: self.options.iterations.unwrap_or(settings.iterations),
            policy: self.services.iteration_policy(),
            key_type,
            output_length: Some(length),
        };
        if algorithm.is_iterated() {
            params.policy.check(params.iterations)?;
        }

        let storage = self.services.storage.as_ref();
        let secret = load_key(storage, &self.source_key_id).await?;

        log.debug(
            "deriving",
            LogMetadata::new()
                .public("kdf", algorithm)
                .public("key_type", key_type)
                .public("length", length)
                .public("salt_supplied", params.salt.is_some()),
        );

        let derived = guarded("derive_key", algorithm, || {
            derive_key_material(&secret.expose_secret()[..], &params)
        })?;
        let identifier = persist(storage, derived.bytes(), self.options.target_id.as_deref()).await?;

        Ok(DerivedKey {
            descriptor: KeyDescriptor::new(identifier, key_type, derived.len()),
            algorithm,
            salt: derived.salt.clone(),
        })
    }
}

#[async_trait]
impl Command for DeriveKeyCommand {
    type Output = DerivedKey;
    const NAME: &'static str = "derive_key";

    async fn execute(&self, context: &OperationContext, operation_id: &str) -> OperationResult<DerivedKey> {
        let log = CommandLog::new(&self.services.logger, Self::NAME, operation_id, context);
        log.started(
            LogMetadata::new()
                .private("source_key_id", &self.source_key_id)
                .public("key_type", self.options.key_type),
        );
        let result = self.run(&log).await;
        log.finish(result, |derived| {
            LogMetadata::new()
                .private("key_id", &derived.descriptor.identifier)
                .public("bit_length", derived.descriptor.bit_length)
        })
    }
}
