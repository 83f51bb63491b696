// src/config/app.rs
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::consts::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
use crate::enums::{HashAlgorithm, KdfAlgorithm};
use crate::error::{CryptoError, OperationResult};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub kdf: KdfSettings,
    pub hashing: HashSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KdfSettings {
    pub default_algorithm: KdfAlgorithm,
    pub iterations: u32,
    pub min_iterations: u32,
    /// Lets callers request fewer than `min_iterations` rounds
    pub allow_below_minimum: bool,
    pub salt_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HashSettings {
    /// Digest used when a Hash request names an algorithm we do not know
    pub fallback_algorithm: HashAlgorithm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub sqlite_path: Option<PathBuf>,
}

impl Default for KdfSettings {
    fn default() -> Self {
        default_kdf()
    }
}

impl Default for HashSettings {
    fn default() -> Self {
        default_hashing()
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        default_storage()
    }
}

impl CryptoConfig {
    fn validate(self) -> OperationResult<Self> {
        if self.kdf.salt_length == 0 {
            return Err(CryptoError::Config("kdf.salt_length must be > 0".into()));
        }
        if self.kdf.min_iterations == 0 {
            return Err(CryptoError::Config("kdf.min_iterations must be > 0".into()));
        }
        if self.hashing.fallback_algorithm.is_keyed()
            || matches!(
                self.hashing.fallback_algorithm,
                HashAlgorithm::Unrecognized(_)
            )
        {
            return Err(CryptoError::Config(format!(
                "hashing.fallback_algorithm must be an unkeyed digest, got {}",
                self.hashing.fallback_algorithm
            )));
        }
        Ok(self)
    }
}

pub fn from_toml_str(content: &str) -> OperationResult<CryptoConfig> {
    let conf: CryptoConfig = toml::from_str(content)?;
    conf.validate()
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> OperationResult<CryptoConfig> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        CryptoError::Config(format!("failed to read {}: {e}", path.as_ref().display()))
    })?;
    from_toml_str(&content)
}

/// Load the file named by `CRYPTO_OPS_CONFIG` (or `crypto-ops.toml`);
/// falls back to built-in defaults when no file exists
pub fn load() -> OperationResult<CryptoConfig> {
    let config_path =
        std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    if Path::new(&config_path).exists() {
        load_from_path(&config_path)
    } else {
        tracing::warn!(path = %config_path, "config file not found, using built-in defaults");
        Ok(CryptoConfig::default())
    }
}
