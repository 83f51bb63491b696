// src/kdf.rs
//! Key derivation: HMAC, PBKDF2 stretching and HKDF expansion
//!
//! Stateless and pure apart from salt generation. Every function is
//! deterministic in its inputs.
//!
//! - [`derive_iterated_hmac`]: RFC 8018 PBKDF2, iteration floor enforced
//! - [`derive_expand`]: RFC 5869 extract-then-expand, at most 255 blocks
//! - [`derive_key_material`]: typed front-end used by the DeriveKey command

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::aliases::{ExposeSecret, KeyMaterial};
use crate::consts::{MAX_EXPAND_BLOCKS, MIN_KDF_ITERATIONS};
use crate::enums::{HmacAlgorithm, KdfAlgorithm, KeyType};
use crate::error::{CryptoError, OperationResult};

fn mac_with<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> OperationResult<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|_| CryptoError::InvalidInput("HMAC key rejected".into()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC(key, data)
pub fn hmac(algorithm: HmacAlgorithm, key: &[u8], data: &[u8]) -> OperationResult<Vec<u8>> {
    match algorithm {
        HmacAlgorithm::Sha256 => mac_with::<Hmac<Sha256>>(key, data),
        HmacAlgorithm::Sha384 => mac_with::<Hmac<Sha384>>(key, data),
        HmacAlgorithm::Sha512 => mac_with::<Hmac<Sha512>>(key, data),
    }
}

/// Iteration floor for PBKDF2-style derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationPolicy {
    pub minimum: u32,
    /// Explicit override that lets callers go below `minimum`
    pub allow_below_minimum: bool,
}

impl Default for IterationPolicy {
    fn default() -> Self {
        Self {
            minimum: MIN_KDF_ITERATIONS,
            allow_below_minimum: false,
        }
    }
}

impl IterationPolicy {
    pub fn check(&self, iterations: u32) -> OperationResult<()> {
        if iterations == 0 {
            return Err(CryptoError::InvalidInput(
                "iteration count must be > 0".into(),
            ));
        }
        if iterations < self.minimum && !self.allow_below_minimum {
            return Err(CryptoError::InvalidInput(format!(
                "iteration count {iterations} is below the minimum of {}",
                self.minimum
            )));
        }
        Ok(())
    }
}

/// PBKDF2 with the default iteration floor
pub fn derive_iterated_hmac(
    secret: &[u8],
    salt: &[u8],
    iterations: u32,
    output_length: usize,
    algorithm: HmacAlgorithm,
) -> OperationResult<Zeroizing<Vec<u8>>> {
    derive_iterated_hmac_with_policy(
        secret,
        salt,
        iterations,
        output_length,
        algorithm,
        &IterationPolicy::default(),
    )
}

pub fn derive_iterated_hmac_with_policy(
    secret: &[u8],
    salt: &[u8],
    iterations: u32,
    output_length: usize,
    algorithm: HmacAlgorithm,
    policy: &IterationPolicy,
) -> OperationResult<Zeroizing<Vec<u8>>> {
    policy.check(iterations)?;
    if output_length == 0 {
        return Err(CryptoError::InvalidInput("output length must be > 0".into()));
    }
    if salt.is_empty() {
        return Err(CryptoError::InvalidInput(
            "iterated derivation requires a salt".into(),
        ));
    }

    let mut derived = Zeroizing::new(vec![0u8; output_length]);
    match algorithm {
        HmacAlgorithm::Sha256 => pbkdf2_hmac::<Sha256>(secret, salt, iterations, &mut derived),
        HmacAlgorithm::Sha384 => pbkdf2_hmac::<Sha384>(secret, salt, iterations, &mut derived),
        HmacAlgorithm::Sha512 => pbkdf2_hmac::<Sha512>(secret, salt, iterations, &mut derived),
    }
    Ok(derived)
}

/// HKDF extract-then-expand
pub fn derive_expand(
    secret: &[u8],
    salt: &[u8],
    info: &[u8],
    output_length: usize,
    algorithm: HmacAlgorithm,
) -> OperationResult<Zeroizing<Vec<u8>>> {
    if output_length == 0 {
        return Err(CryptoError::InvalidInput("output length must be > 0".into()));
    }
    let blocks = output_length.div_ceil(algorithm.output_len());
    if blocks > MAX_EXPAND_BLOCKS {
        return Err(CryptoError::UnsupportedKeyLength(format!(
            "{output_length} bytes needs {blocks} expand blocks, limit is {MAX_EXPAND_BLOCKS}"
        )));
    }

    let mut okm = Zeroizing::new(vec![0u8; output_length]);
    let expanded = match algorithm {
        HmacAlgorithm::Sha256 => Hkdf::<Sha256>::new(Some(salt), secret).expand(info, &mut okm),
        HmacAlgorithm::Sha384 => Hkdf::<Sha384>::new(Some(salt), secret).expand(info, &mut okm),
        HmacAlgorithm::Sha512 => Hkdf::<Sha512>::new(Some(salt), secret).expand(info, &mut okm),
    };
    expanded.map_err(|_| {
        CryptoError::UnsupportedKeyLength(format!("{output_length} bytes exceeds the expand limit"))
    })?;
    Ok(okm)
}

/// Fresh salt from the thread-local CSPRNG
pub fn generate_salt(length: usize) -> Vec<u8> {
    let mut salt = vec![0u8; length];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Inputs to [`derive_key_material`]
#[derive(Debug, Clone)]
pub struct DerivationParams<'a> {
    pub algorithm: KdfAlgorithm,
    /// `None` generates a salt of `salt_length` bytes
    pub salt: Option<&'a [u8]>,
    pub salt_length: usize,
    pub info: &'a [u8],
    pub iterations: u32,
    pub policy: IterationPolicy,
    pub key_type: KeyType,
    /// `None` uses the key type's default length
    pub output_length: Option<usize>,
}

/// Key bytes plus everything needed to derive them again
pub struct DerivedKeyMaterial {
    pub key_type: KeyType,
    pub algorithm: KdfAlgorithm,
    /// Must be kept by the caller; it is required to re-derive the key
    pub salt: Vec<u8>,
    bytes: KeyMaterial,
}

impl DerivedKeyMaterial {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes.expose_secret()[..]
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }
}

/// Check a requested key length against what the key type accepts
pub fn validate_key_length(key_type: KeyType, length: usize) -> OperationResult<()> {
    if let Some(fixed) = key_type.fixed_len() {
        if length != fixed {
            return Err(CryptoError::key_size(key_type, fixed, length));
        }
        return Ok(());
    }
    let (min, max) = key_type.len_range();
    if !(min..=max).contains(&length) {
        return Err(CryptoError::UnsupportedKeyLength(format!(
            "{key_type} keys must be {min}..={max} bytes, got {length}"
        )));
    }
    Ok(())
}

/// Derive typed symmetric key material from a source secret
pub fn derive_key_material(
    secret: &[u8],
    params: &DerivationParams<'_>,
) -> OperationResult<DerivedKeyMaterial> {
    if params.key_type.is_asymmetric() {
        return Err(CryptoError::UnsupportedOperation(format!(
            "cannot derive {} keys; derivation is defined for symmetric and MAC keys only",
            params.key_type
        )));
    }
    if secret.is_empty() {
        return Err(CryptoError::InvalidInput("source secret is empty".into()));
    }

    let length = params
        .output_length
        .unwrap_or_else(|| params.key_type.default_len());
    validate_key_length(params.key_type, length)?;

    let salt = match params.salt {
        Some(salt) => salt.to_vec(),
        None => generate_salt(params.salt_length),
    };

    let hmac = params.algorithm.hmac();
    let derived = if params.algorithm.is_iterated() {
        derive_iterated_hmac_with_policy(
            secret,
            &salt,
            params.iterations,
            length,
            hmac,
            &params.policy,
        )?
    } else {
        derive_expand(secret, &salt, params.info, length, hmac)?
    };

    Ok(DerivedKeyMaterial {
        key_type: params.key_type,
        algorithm: params.algorithm,
        salt,
        bytes: KeyMaterial::from(derived.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use sha2::Digest;

    use super::*;

    #[test]
    fn hmac_handles_keys_longer_than_block() {
        let long_key = [0xaa; 131];
        let a = hmac(HmacAlgorithm::Sha512, &long_key, b"data").unwrap();
        let b = hmac(HmacAlgorithm::Sha512, &Sha512::digest(long_key), b"data").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn expand_rejects_more_than_255_blocks() {
        let err = derive_expand(b"secret", b"salt", b"", 255 * 32 + 1, HmacAlgorithm::Sha256)
            .unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedKeyLength(_)));
        assert!(derive_expand(b"secret", b"salt", b"", 255 * 32, HmacAlgorithm::Sha256).is_ok());
    }

    #[test]
    fn policy_blocks_low_iterations_without_override() {
        let strict = IterationPolicy::default();
        assert!(strict.check(9_999).is_err());
        assert!(strict.check(10_000).is_ok());

        let relaxed = IterationPolicy {
            allow_below_minimum: true,
            ..strict
        };
        assert!(relaxed.check(1).is_ok());
        assert!(relaxed.check(0).is_err());
    }
}
