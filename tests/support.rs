// tests/support.rs
//! Test utilities: in-memory services and a log sink that records lines

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use crypto_ops::config::CryptoConfig;
use crypto_ops::logging::{LogContext, LogLevel, SecureLogger};
use crypto_ops::{CryptoServices, MemoryStorage, SecureStorage, StorageError};
use parking_lot::Mutex;

/// One captured log call
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
    pub context: LogContext,
}

impl LogLine {
    /// What a sink would print: message plus redacted metadata
    pub fn rendered(&self) -> String {
        format!("{} {}", self.message, self.context.metadata)
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    pub fn for_correlation(&self, correlation_id: &str) -> Vec<LogLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.context.correlation_id == correlation_id)
            .collect()
    }

    pub fn at_level(&self, level: LogLevel) -> Vec<LogLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.level == level)
            .collect()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl SecureLogger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext) {
        self.lines.lock().push(LogLine {
            level,
            message: message.to_string(),
            context: context.clone(),
        });
    }
}

/// Memory storage whose reads or writes can be switched to fail
///
/// Every call is counted, failed or not.
pub struct FlakyStorage {
    inner: Arc<MemoryStorage>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyStorage {
    pub fn new(inner: Arc<MemoryStorage>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("backend offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SecureStorage for FlakyStorage {
    async fn store(&self, data: &[u8], identifier: &str) -> Result<(), StorageError> {
        self.check(&self.fail_writes)?;
        self.inner.store(data, identifier).await
    }

    async fn retrieve(&self, identifier: &str) -> Result<Vec<u8>, StorageError> {
        self.check(&self.fail_reads)?;
        self.inner.retrieve(identifier).await
    }

    async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
        self.check(&self.fail_writes)?;
        self.inner.delete(identifier).await
    }
}

/// Services wired to fresh in-memory storage and a recording logger
pub struct TestEnv {
    pub services: CryptoServices,
    pub storage: Arc<MemoryStorage>,
    pub logger: Arc<RecordingLogger>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(CryptoConfig::default())
    }

    pub fn with_config(config: CryptoConfig) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let logger = Arc::new(RecordingLogger::default());
        let services = CryptoServices::new(storage.clone(), logger.clone(), config);
        Self {
            services,
            storage,
            logger,
        }
    }
}

/// [`TestEnv`] whose services go through a [`FlakyStorage`]
///
/// `env.storage` is the memory store underneath, for seeding and inspection.
pub struct FlakyEnv {
    pub env: TestEnv,
    pub flaky: Arc<FlakyStorage>,
}

impl FlakyEnv {
    pub fn new() -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let flaky = Arc::new(FlakyStorage::new(storage.clone()));
        let logger = Arc::new(RecordingLogger::default());
        let services = CryptoServices::new(flaky.clone(), logger.clone(), CryptoConfig::default());
        Self {
            env: TestEnv {
                services,
                storage,
                logger,
            },
            flaky,
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
