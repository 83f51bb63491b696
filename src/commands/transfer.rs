// src/commands/transfer.rs
//! Import and Export: storage pass-through with no cryptographic step

use async_trait::async_trait;

use super::{load_data, persist, Command, CommandLog, DataSource, OperationContext};
use crate::enums::ExportEncoding;
use crate::error::{CryptoError, OperationResult};
use crate::keys::encode_export;
use crate::logging::LogMetadata;
use crate::services::CryptoServices;

/// Store caller-supplied bytes; returns the identifier used
pub struct ImportCommand {
    services: CryptoServices,
    data: Vec<u8>,
    identifier: Option<String>,
}

impl ImportCommand {
    pub fn new(services: CryptoServices, data: Vec<u8>, identifier: Option<String>) -> Self {
        Self {
            services,
            data,
            identifier,
        }
    }
}

#[async_trait]
impl Command for ImportCommand {
    type Output = String;
    const NAME: &'static str = "import";

    async fn execute(&self, context: &OperationContext, operation_id: &str) -> OperationResult<String> {
        let log = CommandLog::new(&self.services.logger, Self::NAME, operation_id, context);
        log.started(LogMetadata::new().public("data_size", self.data.len()));
        let result = persist(
            self.services.storage.as_ref(),
            &self.data,
            self.identifier.as_deref(),
        )
        .await;
        log.finish(result, |id| LogMetadata::new().private("identifier", id))
    }
}

/// Read a stored blob back out, optionally text-encoded
pub struct ExportCommand {
    services: CryptoServices,
    identifier: String,
    encoding: ExportEncoding,
}

impl ExportCommand {
    pub fn new(services: CryptoServices, identifier: impl Into<String>, encoding: ExportEncoding) -> Self {
        Self {
            services,
            identifier: identifier.into(),
            encoding,
        }
    }

    async fn run(&self) -> OperationResult<Vec<u8>> {
        if self.identifier.is_empty() {
            return Err(CryptoError::InvalidInput("identifier is required".into()));
        }
        let source = DataSource::id(self.identifier.as_str());
        let bytes = load_data(self.services.storage.as_ref(), &source).await?;
        Ok(encode_export(bytes.to_vec(), self.encoding))
    }
}

#[async_trait]
impl Command for ExportCommand {
    type Output = Vec<u8>;
    const NAME: &'static str = "export";

    async fn execute(&self, context: &OperationContext, operation_id: &str) -> OperationResult<Vec<u8>> {
        let log = CommandLog::new(&self.services.logger, Self::NAME, operation_id, context);
        log.started(
            LogMetadata::new()
                .private("identifier", &self.identifier)
                .public("encoding", format!("{:?}", self.encoding)),
        );
        let result = self.run().await;
        log.finish(result, |bytes| LogMetadata::new().public("output_size", bytes.len()))
    }
}
