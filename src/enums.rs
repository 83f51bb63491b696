// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for the enums that represent user-visible choices:
//! cipher algorithms, digests, derivation functions and engine tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{AEAD_NONCE_SIZE, BLOCK_IV_SIZE, TAG_SIZE};

/// Supported encryption algorithms
///
/// The numeric id is persisted in canonical envelopes; never renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum EncryptionAlgorithm {
    Aes256Gcm,
    Aes128Gcm,
    ChaCha20Poly1305,
    Aes256Cbc,
}

impl EncryptionAlgorithm {
    pub const fn id(self) -> u8 {
        match self {
            EncryptionAlgorithm::Aes256Gcm => 1,
            EncryptionAlgorithm::Aes128Gcm => 2,
            EncryptionAlgorithm::ChaCha20Poly1305 => 3,
            EncryptionAlgorithm::Aes256Cbc => 4,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(EncryptionAlgorithm::Aes256Gcm),
            2 => Some(EncryptionAlgorithm::Aes128Gcm),
            3 => Some(EncryptionAlgorithm::ChaCha20Poly1305),
            4 => Some(EncryptionAlgorithm::Aes256Cbc),
            _ => None,
        }
    }

    pub const fn key_len(self) -> usize {
        match self {
            EncryptionAlgorithm::Aes128Gcm => 16,
            _ => 32,
        }
    }

    pub const fn iv_len(self) -> usize {
        match self {
            EncryptionAlgorithm::Aes256Cbc => BLOCK_IV_SIZE,
            _ => AEAD_NONCE_SIZE,
        }
    }

    pub const fn is_authenticated(self) -> bool {
        !matches!(self, EncryptionAlgorithm::Aes256Cbc)
    }

    /// Tag length appended by the mode, zero for unauthenticated modes
    pub const fn tag_len(self) -> usize {
        if self.is_authenticated() {
            TAG_SIZE
        } else {
            0
        }
    }
}

impl fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncryptionAlgorithm::Aes256Gcm => "aes-256-gcm",
            EncryptionAlgorithm::Aes128Gcm => "aes-128-gcm",
            EncryptionAlgorithm::ChaCha20Poly1305 => "chacha20-poly1305",
            EncryptionAlgorithm::Aes256Cbc => "aes-256-cbc",
        })
    }
}

/// Hash function underlying an HMAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HmacAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HmacAlgorithm {
    pub const fn output_len(self) -> usize {
        match self {
            HmacAlgorithm::Sha256 => 32,
            HmacAlgorithm::Sha384 => 48,
            HmacAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HmacAlgorithm::Sha256 => "hmac-sha256",
            HmacAlgorithm::Sha384 => "hmac-sha384",
            HmacAlgorithm::Sha512 => "hmac-sha512",
        })
    }
}

/// Digest selector for the Hash and VerifyHash commands
///
/// Parsed from free-form tags; a tag this crate does not know is kept as
/// `Unrecognized` so the Hash command can fall back instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
    Blake3,
    HmacSha256,
    HmacSha384,
    HmacSha512,
    Blake3Keyed,
    Unrecognized(String),
}

impl HashAlgorithm {
    pub fn is_keyed(&self) -> bool {
        matches!(
            self,
            HashAlgorithm::HmacSha256
                | HashAlgorithm::HmacSha384
                | HashAlgorithm::HmacSha512
                | HashAlgorithm::Blake3Keyed
        )
    }

    pub fn tag(&self) -> &str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::HmacSha256 => "hmac-sha256",
            HashAlgorithm::HmacSha384 => "hmac-sha384",
            HashAlgorithm::HmacSha512 => "hmac-sha512",
            HashAlgorithm::Blake3Keyed => "blake3-keyed",
            HashAlgorithm::Unrecognized(tag) => tag,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], "");
        Ok(match normalized.as_str() {
            "sha256" => HashAlgorithm::Sha256,
            "sha384" => HashAlgorithm::Sha384,
            "sha512" => HashAlgorithm::Sha512,
            "blake3" => HashAlgorithm::Blake3,
            "hmacsha256" => HashAlgorithm::HmacSha256,
            "hmacsha384" => HashAlgorithm::HmacSha384,
            "hmacsha512" => HashAlgorithm::HmacSha512,
            "blake3keyed" => HashAlgorithm::Blake3Keyed,
            _ => HashAlgorithm::Unrecognized(s.to_string()),
        })
    }
}

impl From<String> for HashAlgorithm {
    fn from(tag: String) -> Self {
        match tag.parse() {
            Ok(alg) => alg,
            Err(never) => match never {},
        }
    }
}

impl From<HashAlgorithm> for String {
    fn from(alg: HashAlgorithm) -> Self {
        alg.tag().to_string()
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Key derivation functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KdfAlgorithm {
    #[default]
    HkdfSha256,
    HkdfSha512,
    Pbkdf2Sha256,
    Pbkdf2Sha512,
}

impl KdfAlgorithm {
    pub const fn hmac(self) -> HmacAlgorithm {
        match self {
            KdfAlgorithm::HkdfSha256 | KdfAlgorithm::Pbkdf2Sha256 => HmacAlgorithm::Sha256,
            KdfAlgorithm::HkdfSha512 | KdfAlgorithm::Pbkdf2Sha512 => HmacAlgorithm::Sha512,
        }
    }

    pub const fn is_iterated(self) -> bool {
        matches!(self, KdfAlgorithm::Pbkdf2Sha256 | KdfAlgorithm::Pbkdf2Sha512)
    }
}

impl fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KdfAlgorithm::HkdfSha256 => "hkdf-sha256",
            KdfAlgorithm::HkdfSha512 => "hkdf-sha512",
            KdfAlgorithm::Pbkdf2Sha256 => "pbkdf2-sha256",
            KdfAlgorithm::Pbkdf2Sha512 => "pbkdf2-sha512",
        })
    }
}

/// Kinds of key material tracked by descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum KeyType {
    Aes128,
    Aes256,
    ChaCha20,
    HmacSha256,
    HmacSha512,
    /// Variable-length symmetric secret
    Generic,
    /// Curve25519 Diffie-Hellman secret scalar
    X25519,
    Rsa2048,
    Rsa4096,
    EcP256,
}

impl KeyType {
    pub const fn is_asymmetric(self) -> bool {
        matches!(
            self,
            KeyType::X25519 | KeyType::Rsa2048 | KeyType::Rsa4096 | KeyType::EcP256
        )
    }

    /// Exact length for algorithms that accept only one key size
    pub const fn fixed_len(self) -> Option<usize> {
        match self {
            KeyType::Aes128 => Some(16),
            KeyType::Aes256 | KeyType::ChaCha20 | KeyType::X25519 => Some(32),
            _ => None,
        }
    }

    pub const fn default_len(self) -> usize {
        match self {
            KeyType::Aes128 => 16,
            KeyType::HmacSha512 => 64,
            _ => 32,
        }
    }

    /// Inclusive byte range accepted for variable-length key types
    pub const fn len_range(self) -> (usize, usize) {
        match self.fixed_len() {
            Some(len) => (len, len),
            None => (16, 128),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyType::Aes128 => "aes-128",
            KeyType::Aes256 => "aes-256",
            KeyType::ChaCha20 => "chacha20",
            KeyType::HmacSha256 => "hmac-sha256",
            KeyType::HmacSha512 => "hmac-sha512",
            KeyType::Generic => "generic",
            KeyType::X25519 => "x25519",
            KeyType::Rsa2048 => "rsa-2048",
            KeyType::Rsa4096 => "rsa-4096",
            KeyType::EcP256 => "ec-p256",
        })
    }
}

/// Explicit engine selection token; there is deliberately no default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineType {
    /// General-purpose software engine
    Standard,
    /// Engine backed by platform crypto services
    PlatformAccelerated,
    /// Cross-platform engine restricted to constant-time software primitives
    Portable,
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EngineType::Standard => "standard",
            EngineType::PlatformAccelerated => "platform-accelerated",
            EngineType::Portable => "portable",
        })
    }
}

/// Output encoding for the Export command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExportEncoding {
    #[default]
    Raw,
    Hex,
    Base64,
    Base64UrlNoPad,
}
