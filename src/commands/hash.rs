// src/commands/hash.rs
use async_trait::async_trait;
use zeroize::Zeroizing;

use super::{load_data, load_key, Command, CommandLog, DataSource, OperationContext};
use crate::aliases::ExposeSecret;
use crate::enums::HashAlgorithm;
use crate::error::{CryptoError, OperationResult};
use crate::logging::LogMetadata;
use crate::primitives::{self, guarded};
use crate::services::CryptoServices;

#[derive(Debug, Clone)]
pub struct HashOptions {
    pub algorithm: HashAlgorithm,
    /// Prepended to the data before hashing
    pub salt: Option<Vec<u8>>,
    /// Required by keyed algorithms, rejected by the others
    pub key: Option<DataSource>,
}

impl HashOptions {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            salt: None,
            key: None,
        }
    }

    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn with_key(mut self, key: DataSource) -> Self {
        self.key = Some(key);
        self
    }
}

impl Default for HashOptions {
    fn default() -> Self {
        Self::new(HashAlgorithm::Sha256)
    }
}

/// Digest or MAC over a data source; returns the raw digest bytes
#[derive(Clone)]
pub struct HashCommand {
    services: CryptoServices,
    data: DataSource,
    options: HashOptions,
}

impl HashCommand {
    pub fn new(services: CryptoServices, data: DataSource, options: HashOptions) -> Self {
        Self {
            services,
            data,
            options,
        }
    }

    /// Unknown tags hash with the configured fallback digest
    fn effective_algorithm(&self, log: &CommandLog) -> HashAlgorithm {
        match &self.options.algorithm {
            HashAlgorithm::Unrecognized(tag) => {
                let fallback = self.services.config.hashing.fallback_algorithm.clone();
                log.warning(
                    "unrecognised hash algorithm, using fallback digest",
                    LogMetadata::new()
                        .public("requested", tag)
                        .public("fallback", &fallback),
                );
                fallback
            }
            known => known.clone(),
        }
    }

    pub(crate) async fn compute(&self, log: &CommandLog) -> OperationResult<Vec<u8>> {
        let algorithm = self.effective_algorithm(log);
        match (algorithm.is_keyed(), &self.options.key) {
            (true, None) => {
                return Err(CryptoError::InvalidInput(format!("{algorithm} requires a key")))
            }
            (false, Some(_)) => {
                return Err(CryptoError::InvalidInput(format!(
                    "{algorithm} is unkeyed; supply no key"
                )))
            }
            _ => {}
        }
        let storage = self.services.storage.as_ref();
        let data = load_data(storage, &self.data).await?;
        let salt = self.options.salt.as_deref().unwrap_or_default();

        log.debug(
            "hashing",
            LogMetadata::new()
                .public("algorithm", &algorithm)
                .public("data_size", data.len())
                .public("salted", !salt.is_empty()),
        );

        match &self.options.key {
            None => guarded("hash", &algorithm, || {
                primitives::digest(&algorithm, &[salt, &data])
            }),
            Some(key_source) => {
                let key = match key_source {
                    DataSource::Identifier(id) => {
                        Zeroizing::new(load_key(storage, id).await?.expose_secret().to_vec())
                    }
                    DataSource::Bytes(bytes) => Zeroizing::new(bytes.clone()),
                };
                let mut message = Zeroizing::new(Vec::with_capacity(salt.len() + data.len()));
                message.extend_from_slice(salt);
                message.extend_from_slice(&data);
                guarded("hash", &algorithm, || {
                    primitives::keyed_digest(&algorithm, &key, &message)
                })
            }
        }
    }
}

#[async_trait]
impl Command for HashCommand {
    type Output = Vec<u8>;
    const NAME: &'static str = "hash";

    async fn execute(&self, context: &OperationContext, operation_id: &str) -> OperationResult<Vec<u8>> {
        let log = CommandLog::new(&self.services.logger, Self::NAME, operation_id, context);
        log.started(self.data.describe(
            LogMetadata::new().public("algorithm", &self.options.algorithm),
            "data_id",
        ));
        let result = self.compute(&log).await;
        log.finish(result, |digest| LogMetadata::new().public("digest_size", digest.len()))
    }
}
