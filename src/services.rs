// src/services.rs
//! Explicit environment shared by the registry, factory and engines

use std::sync::Arc;

use crate::config::{self, CryptoConfig};
use crate::error::OperationResult;
use crate::kdf::IterationPolicy;
use crate::logging::{SecureLogger, TracingLogger};
use crate::storage::{self, SecureStorage};

#[derive(Clone)]
pub struct CryptoServices {
    pub storage: Arc<dyn SecureStorage>,
    pub logger: Arc<dyn SecureLogger>,
    pub config: Arc<CryptoConfig>,
}

impl CryptoServices {
    pub fn new(
        storage: Arc<dyn SecureStorage>,
        logger: Arc<dyn SecureLogger>,
        config: CryptoConfig,
    ) -> Self {
        Self {
            storage,
            logger,
            config: Arc::new(config),
        }
    }

    /// Storage backend from the config, logging through `tracing`
    pub fn from_config(config: CryptoConfig) -> OperationResult<Self> {
        let storage = storage::open(&config.storage)?;
        Ok(Self::new(storage, Arc::new(TracingLogger), config))
    }

    /// `config::load()` followed by [`CryptoServices::from_config`]
    pub fn load() -> OperationResult<Self> {
        Self::from_config(config::load()?)
    }

    pub fn iteration_policy(&self) -> IterationPolicy {
        IterationPolicy {
            minimum: self.config.kdf.min_iterations,
            allow_below_minimum: self.config.kdf.allow_below_minimum,
        }
    }
}
