// src/keys.rs
//! Key descriptors, key generation and representation utilities
//!
//! This module sizes and generates key material and renders raw bytes in
//! the encodings offered by the Export command.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::aliases::KeyMaterial;
use crate::enums::{ExportEncoding, KdfAlgorithm, KeyType};
use crate::error::{CryptoError, OperationResult};
use crate::kdf::validate_key_length;

/// What GenerateKey and DeriveKey hand back instead of key bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    pub identifier: String,
    pub key_type: KeyType,
    pub bit_length: usize,
    pub created_at: DateTime<Utc>,
}

impl KeyDescriptor {
    pub fn new(identifier: impl Into<String>, key_type: KeyType, byte_length: usize) -> Self {
        Self {
            identifier: identifier.into(),
            key_type,
            bit_length: byte_length * 8,
            created_at: Utc::now(),
        }
    }
}

/// Result of DeriveKey; `salt` is needed to derive the same key again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedKey {
    pub descriptor: KeyDescriptor,
    pub algorithm: KdfAlgorithm,
    #[serde(with = "hex_bytes")]
    pub salt: Vec<u8>,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        hex::decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Random key bytes for a symmetric or fixed-size key type
///
/// RSA and EC keys are not generated here; asking for them is an
/// `UnsupportedOperation`, never a silently weaker substitute.
pub fn generate_key_material(key_type: KeyType, length: Option<usize>) -> OperationResult<KeyMaterial> {
    if matches!(key_type, KeyType::Rsa2048 | KeyType::Rsa4096 | KeyType::EcP256) {
        return Err(CryptoError::UnsupportedOperation(format!(
            "{key_type} key generation is not implemented"
        )));
    }
    let length = length.unwrap_or_else(|| key_type.default_len());
    validate_key_length(key_type, length)?;

    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);
    if key_type == KeyType::X25519 {
        // RFC 7748 scalar clamping
        bytes[0] &= 248;
        bytes[31] &= 127;
        bytes[31] |= 64;
    }
    Ok(KeyMaterial::from(bytes))
}

/// Render bytes in the requested export encoding
pub fn encode_export(bytes: Vec<u8>, encoding: ExportEncoding) -> Vec<u8> {
    match encoding {
        ExportEncoding::Raw => bytes,
        ExportEncoding::Hex => hex::encode(&bytes).into_bytes(),
        ExportEncoding::Base64 => STANDARD.encode(&bytes).into_bytes(),
        ExportEncoding::Base64UrlNoPad => URL_SAFE_NO_PAD.encode(&bytes).into_bytes(),
    }
}
