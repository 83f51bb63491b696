// src/primitives/cipher.rs
use aes_gcm::aead::{Aead, KeyInit, Nonce};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chacha20poly1305::ChaCha20Poly1305;
use rand::RngCore;

use crate::consts::TAG_SIZE;
use crate::enums::EncryptionAlgorithm;
use crate::error::{CryptoError, OperationResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Output of [`seal`]: ciphertext with the tag split off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: Option<Vec<u8>>,
}

/// Fresh IV/nonce of the length the algorithm requires
pub fn random_iv(algorithm: EncryptionAlgorithm) -> Vec<u8> {
    let mut iv = vec![0u8; algorithm.iv_len()];
    rand::rng().fill_bytes(&mut iv);
    iv
}

fn check_params(algorithm: EncryptionAlgorithm, key: &[u8], iv: &[u8]) -> OperationResult<()> {
    if key.len() != algorithm.key_len() {
        return Err(CryptoError::key_size(algorithm, algorithm.key_len(), key.len()));
    }
    if iv.len() != algorithm.iv_len() {
        return Err(CryptoError::InvalidInput(format!(
            "{algorithm} needs a {}-byte IV, got {}",
            algorithm.iv_len(),
            iv.len()
        )));
    }
    Ok(())
}

pub fn seal(
    algorithm: EncryptionAlgorithm,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> OperationResult<Sealed> {
    check_params(algorithm, key, iv)?;
    match algorithm {
        EncryptionAlgorithm::Aes256Gcm => aead_seal::<Aes256Gcm>(algorithm, key, iv, plaintext),
        EncryptionAlgorithm::Aes128Gcm => aead_seal::<Aes128Gcm>(algorithm, key, iv, plaintext),
        EncryptionAlgorithm::ChaCha20Poly1305 => {
            aead_seal::<ChaCha20Poly1305>(algorithm, key, iv, plaintext)
        }
        EncryptionAlgorithm::Aes256Cbc => {
            let ciphertext = Aes256CbcEnc::new_from_slices(key, iv)
                .map_err(|_| CryptoError::operation_failed("encrypt", algorithm, "cipher init"))?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
            Ok(Sealed {
                ciphertext,
                tag: None,
            })
        }
    }
}

pub fn open(
    algorithm: EncryptionAlgorithm,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: Option<&[u8]>,
) -> OperationResult<Vec<u8>> {
    check_params(algorithm, key, iv)?;
    match (algorithm, tag) {
        (EncryptionAlgorithm::Aes256Cbc, None) => Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|_| CryptoError::operation_failed("decrypt", algorithm, "cipher init"))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::operation_failed("decrypt", algorithm, "invalid padding")),
        (EncryptionAlgorithm::Aes256Cbc, Some(_)) => Err(CryptoError::MalformedEnvelope(format!(
            "{algorithm} envelopes carry no tag"
        ))),
        (_, None) => Err(CryptoError::MalformedEnvelope(format!(
            "{algorithm} envelope is missing its authentication tag"
        ))),
        (EncryptionAlgorithm::Aes256Gcm, Some(tag)) => {
            aead_open::<Aes256Gcm>(algorithm, key, iv, ciphertext, tag)
        }
        (EncryptionAlgorithm::Aes128Gcm, Some(tag)) => {
            aead_open::<Aes128Gcm>(algorithm, key, iv, ciphertext, tag)
        }
        (EncryptionAlgorithm::ChaCha20Poly1305, Some(tag)) => {
            aead_open::<ChaCha20Poly1305>(algorithm, key, iv, ciphertext, tag)
        }
    }
}

fn aead_seal<C: Aead + KeyInit>(
    algorithm: EncryptionAlgorithm,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> OperationResult<Sealed> {
    let cipher = C::new_from_slice(key)
        .map_err(|_| CryptoError::operation_failed("encrypt", algorithm, "cipher init"))?;
    let mut combined = cipher
        .encrypt(Nonce::<C>::from_slice(iv), plaintext)
        .map_err(|_| CryptoError::operation_failed("encrypt", algorithm, "seal failed"))?;

    // aead crates return ciphertext || tag
    let tag = combined.split_off(combined.len() - TAG_SIZE);
    Ok(Sealed {
        ciphertext: combined,
        tag: Some(tag),
    })
}

fn aead_open<C: Aead + KeyInit>(
    algorithm: EncryptionAlgorithm,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> OperationResult<Vec<u8>> {
    if tag.len() != TAG_SIZE {
        return Err(CryptoError::MalformedEnvelope(format!(
            "tag must be {TAG_SIZE} bytes, got {}",
            tag.len()
        )));
    }
    let cipher = C::new_from_slice(key)
        .map_err(|_| CryptoError::operation_failed("decrypt", algorithm, "cipher init"))?;

    let mut combined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::<C>::from_slice(iv), combined.as_slice())
        .map_err(|_| CryptoError::operation_failed("decrypt", algorithm, "authentication failed"))
}
