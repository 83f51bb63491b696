// src/commands/verify_hash.rs
use async_trait::async_trait;

use super::{Command, CommandLog, DataSource, HashCommand, HashOptions, OperationContext};
use crate::error::{CryptoError, OperationResult};
use crate::logging::LogMetadata;
use crate::primitives::constant_time_eq;
use crate::services::CryptoServices;

/// Recompute a digest and compare it to an expected value in constant time
///
/// Only the boolean outcome is returned; the fresh digest never leaves the
/// command.
pub struct VerifyHashCommand {
    services: CryptoServices,
    hash: HashCommand,
    expected: Vec<u8>,
}

impl VerifyHashCommand {
    pub fn new(
        services: CryptoServices,
        data: DataSource,
        expected: impl Into<Vec<u8>>,
        options: HashOptions,
    ) -> Self {
        Self {
            hash: HashCommand::new(services.clone(), data, options),
            services,
            expected: expected.into(),
        }
    }
}

#[async_trait]
impl Command for VerifyHashCommand {
    type Output = bool;
    const NAME: &'static str = "verify_hash";

    async fn execute(&self, context: &OperationContext, operation_id: &str) -> OperationResult<bool> {
        let log = CommandLog::new(&self.services.logger, Self::NAME, operation_id, context);
        log.started(LogMetadata::new().public("expected_size", self.expected.len()));

        let result = if self.expected.is_empty() {
            Err(CryptoError::InvalidInput("expected digest is empty".into()))
        } else {
            self.hash
                .compute(&log)
                .await
                .map(|actual| constant_time_eq(&actual, &self.expected))
        };
        log.finish(result, |matched| LogMetadata::new().public("matched", matched))
    }
}
