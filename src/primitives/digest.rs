// src/primitives/digest.rs
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::enums::{HashAlgorithm, HmacAlgorithm};
use crate::error::{CryptoError, OperationResult};
use crate::kdf::hmac;

/// Unkeyed digest; `parts` are hashed as one concatenated message
pub fn digest(algorithm: &HashAlgorithm, parts: &[&[u8]]) -> OperationResult<Vec<u8>> {
    Ok(match algorithm {
        HashAlgorithm::Sha256 => chain::<Sha256>(parts),
        HashAlgorithm::Sha384 => chain::<Sha384>(parts),
        HashAlgorithm::Sha512 => chain::<Sha512>(parts),
        HashAlgorithm::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.finalize().as_bytes().to_vec()
        }
        keyed if keyed.is_keyed() => {
            return Err(CryptoError::InvalidInput(format!("{keyed} requires a key")))
        }
        other => {
            return Err(CryptoError::UnsupportedOperation(format!(
                "unknown digest algorithm {other}"
            )))
        }
    })
}

fn chain<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// MAC over `data`; HMAC variants accept any non-empty key, BLAKE3 keyed
/// mode needs exactly 32 bytes
pub fn keyed_digest(algorithm: &HashAlgorithm, key: &[u8], data: &[u8]) -> OperationResult<Vec<u8>> {
    if key.is_empty() {
        return Err(CryptoError::InvalidInput(format!(
            "{algorithm} requires a non-empty key"
        )));
    }
    match algorithm {
        HashAlgorithm::HmacSha256 => hmac(HmacAlgorithm::Sha256, key, data),
        HashAlgorithm::HmacSha384 => hmac(HmacAlgorithm::Sha384, key, data),
        HashAlgorithm::HmacSha512 => hmac(HmacAlgorithm::Sha512, key, data),
        HashAlgorithm::Blake3Keyed => {
            let key: [u8; 32] = key
                .try_into()
                .map_err(|_| CryptoError::key_size(algorithm, 32, key.len()))?;
            Ok(blake3::keyed_hash(&key, data).as_bytes().to_vec())
        }
        other => Err(CryptoError::InvalidInput(format!(
            "{other} is not a keyed algorithm"
        ))),
    }
}
