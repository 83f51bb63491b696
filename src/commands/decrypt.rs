// src/commands/decrypt.rs
use async_trait::async_trait;

use super::{load_data, load_key, AlgorithmPolicy, Command, CommandLog, DataSource, OperationContext};
use crate::aliases::{ExposeSecret, PlainText};
use crate::consts::MIN_ENVELOPE_SIZE;
use crate::error::{CryptoError, OperationResult};
use crate::format;
use crate::logging::LogMetadata;
use crate::primitives::{self, guarded};
use crate::services::CryptoServices;

#[derive(Debug, Clone, Default)]
pub struct DecryptOptions {
    /// Overrides the key reference embedded in the envelope
    pub key_id: Option<String>,
    /// Read magic-less blobs as the keyed `[IV][ct][len][keyID]` layout
    pub legacy_keyed: bool,
}

impl DecryptOptions {
    pub fn with_key(key_id: impl Into<String>) -> Self {
        Self {
            key_id: Some(key_id.into()),
            ..Self::default()
        }
    }

    pub fn legacy_keyed(mut self) -> Self {
        self.legacy_keyed = true;
        self
    }
}

/// Open a stored envelope and return the plaintext
///
/// Reads the canonical layout and version 1 envelopes, plus the keyed
/// legacy layout when the options ask for it. The key comes from the caller or, failing that, from the
/// envelope's own key reference.
pub struct DecryptCommand {
    services: CryptoServices,
    algorithms: AlgorithmPolicy,
    envelope_id: String,
    options: DecryptOptions,
}

impl DecryptCommand {
    pub fn new(
        services: CryptoServices,
        algorithms: AlgorithmPolicy,
        envelope_id: impl Into<String>,
        options: DecryptOptions,
    ) -> Self {
        Self {
            services,
            algorithms,
            envelope_id: envelope_id.into(),
            options,
        }
    }

    fn resolve_key_id(
        &self,
        embedded: Option<&str>,
        log: &CommandLog,
    ) -> OperationResult<String> {
        match (self.options.key_id.as_deref(), embedded) {
            (Some(requested), Some(embedded)) => {
                if requested != embedded {
                    log.warning(
                        "caller key overrides the envelope key reference",
                        LogMetadata::new()
                            .private("key_id", requested)
                            .private("embedded_key_id", embedded),
                    );
                }
                Ok(requested.to_string())
            }
            (Some(requested), None) => Ok(requested.to_string()),
            (None, Some(embedded)) => Ok(embedded.to_string()),
            (None, None) => Err(CryptoError::InvalidInput(
                "no key identifier supplied and the envelope carries none".into(),
            )),
        }
    }

    async fn run(&self, log: &CommandLog) -> OperationResult<PlainText> {
        if self.envelope_id.is_empty() {
            return Err(CryptoError::InvalidInput("envelope identifier is required".into()));
        }
        if matches!(self.options.key_id.as_deref(), Some("")) {
            return Err(CryptoError::InvalidInput("key identifier must not be empty".into()));
        }
        let storage = self.services.storage.as_ref();

        let blob = load_data(storage, &DataSource::id(self.envelope_id.as_str())).await?;
        if blob.len() < MIN_ENVELOPE_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "{} bytes is below the {MIN_ENVELOPE_SIZE}-byte minimum",
                blob.len()
            )));
        }
        let envelope = format::decode(&blob, self.options.legacy_keyed)?;
        let algorithm = envelope.algorithm.ok_or_else(|| {
            CryptoError::UnsupportedOperation(
                "version 1 envelope with a tag does not name its algorithm".into(),
            )
        })?;
        self.algorithms.check(algorithm)?;

        let key_id = self.resolve_key_id(envelope.key_reference.as_deref(), log)?;
        let key = load_key(storage, &key_id).await?;
        let key = &key.expose_secret()[..];
        if key.len() != algorithm.key_len() {
            return Err(CryptoError::key_size(algorithm, algorithm.key_len(), key.len()));
        }

        log.debug(
            "opening",
            LogMetadata::new()
                .public("algorithm", algorithm)
                .public("envelope_version", envelope.version)
                .public("ciphertext_size", envelope.ciphertext.len()),
        );

        let plaintext = guarded("decrypt", algorithm, || {
            primitives::open(
                algorithm,
                key,
                &envelope.iv,
                &envelope.ciphertext,
                envelope.tag.as_deref(),
            )
        })?;
        Ok(PlainText::from(plaintext))
    }
}

#[async_trait]
impl Command for DecryptCommand {
    type Output = PlainText;
    const NAME: &'static str = "decrypt";

    async fn execute(&self, context: &OperationContext, operation_id: &str) -> OperationResult<PlainText> {
        let log = CommandLog::new(&self.services.logger, Self::NAME, operation_id, context);
        let mut metadata = LogMetadata::new().private("envelope_id", &self.envelope_id);
        if let Some(key_id) = &self.options.key_id {
            metadata = metadata.private("key_id", key_id);
        }
        log.started(metadata);
        let result = self.run(&log).await;
        log.finish(result, |plain| {
            LogMetadata::new().public("plaintext_size", plain.expose_secret().len())
        })
    }
}
