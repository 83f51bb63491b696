// src/logging.rs
//! Privacy-tiered structured logging
//!
//! Every command reports through a [`SecureLogger`]. Metadata values carry a
//! [`Privacy`] tag; sinks must never render `Private` values in the clear.

use std::fmt;

use crate::consts::REDACTED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privacy {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
    pub privacy: Privacy,
}

impl MetadataEntry {
    /// Value as a sink may print it
    pub fn rendered(&self) -> &str {
        match self.privacy {
            Privacy::Public => &self.value,
            Privacy::Private => REDACTED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMetadata {
    entries: Vec<MetadataEntry>,
}

impl LogMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value, Privacy::Public);
        self
    }

    pub fn private(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value, Privacy::Private);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString, privacy: Privacy) {
        self.entries.push(MetadataEntry {
            key: key.into(),
            value: value.to_string(),
            privacy,
        });
    }

    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&MetadataEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// `key=value` pairs with private values redacted
impl fmt::Display for LogMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", entry.key, entry.rendered())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub operation: String,
    pub correlation_id: String,
    pub metadata: LogMetadata,
}

impl LogContext {
    pub fn new(operation: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            correlation_id: correlation_id.into(),
            metadata: LogMetadata::new(),
        }
    }

    pub fn with_public(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.push(key, value, Privacy::Public);
        self
    }

    pub fn with_private(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.push(key, value, Privacy::Private);
        self
    }

    pub fn with_metadata(mut self, metadata: &LogMetadata) -> Self {
        self.metadata.entries.extend(metadata.entries.iter().cloned());
        self
    }
}

/// Structured log sink shared by commands and engines
///
/// Implementations must tolerate concurrent calls.
pub trait SecureLogger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext);

    fn debug(&self, message: &str, context: &LogContext) {
        self.log(LogLevel::Debug, message, context);
    }

    fn info(&self, message: &str, context: &LogContext) {
        self.log(LogLevel::Info, message, context);
    }

    fn warning(&self, message: &str, context: &LogContext) {
        self.log(LogLevel::Warning, message, context);
    }

    fn error(&self, message: &str, context: &LogContext) {
        self.log(LogLevel::Error, message, context);
    }
}

/// Default sink: forwards to `tracing` with redacted metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl SecureLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext) {
        let op = context.operation.as_str();
        let id = context.correlation_id.as_str();
        let meta = &context.metadata;
        match level {
            LogLevel::Debug => {
                tracing::debug!(operation = op, correlation_id = id, metadata = %meta, "{message}")
            }
            LogLevel::Info => {
                tracing::info!(operation = op, correlation_id = id, metadata = %meta, "{message}")
            }
            LogLevel::Warning => {
                tracing::warn!(operation = op, correlation_id = id, metadata = %meta, "{message}")
            }
            LogLevel::Error => {
                tracing::error!(operation = op, correlation_id = id, metadata = %meta, "{message}")
            }
        }
    }
}
