// src/format/keyed.rs
//! Keyed legacy layout: `[IV(16)][ciphertext][key_id_len(1)][key_id]`
//!
//! Written by older AES-256-CBC producers. There is no magic and no
//! explicit ciphertext length, so the trailer is located by scanning for a
//! length byte that matches the bytes after it, with the ciphertext a whole
//! number of cipher blocks. The scan runs from the longest candidate down:
//! a key id may contain a byte that looks like a shorter length, while a
//! longer false match would need random ciphertext to pass as UTF-8.

use crate::consts::{BLOCK_IV_SIZE, CIPHER_BLOCK_SIZE};
use crate::error::{CryptoError, OperationResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedEnvelope {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub key_id: String,
}

pub fn pack_keyed(iv: &[u8], ciphertext: &[u8], key_id: &str) -> OperationResult<Vec<u8>> {
    if iv.len() != BLOCK_IV_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "keyed layout needs a {BLOCK_IV_SIZE}-byte IV, got {}",
            iv.len()
        )));
    }
    if ciphertext.is_empty() || ciphertext.len() % CIPHER_BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidInput(
            "keyed layout ciphertext must be whole cipher blocks".into(),
        ));
    }
    if key_id.is_empty() || key_id.len() > u8::MAX as usize {
        return Err(CryptoError::InvalidInput(format!(
            "key id must be 1..=255 bytes, got {}",
            key_id.len()
        )));
    }

    let mut out = Vec::with_capacity(iv.len() + ciphertext.len() + 1 + key_id.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(ciphertext);
    out.push(key_id.len() as u8);
    out.extend_from_slice(key_id.as_bytes());
    Ok(out)
}

pub fn unpack_keyed(data: &[u8]) -> OperationResult<KeyedEnvelope> {
    let minimum = BLOCK_IV_SIZE + CIPHER_BLOCK_SIZE + 2;
    if data.len() < minimum {
        return Err(CryptoError::MalformedEnvelope(format!(
            "keyed envelope needs at least {minimum} bytes, got {}",
            data.len()
        )));
    }

    let max_key_len = (data.len() - BLOCK_IV_SIZE - CIPHER_BLOCK_SIZE - 1).min(u8::MAX as usize);
    for key_len in (1..=max_key_len).rev() {
        let len_at = data.len() - 1 - key_len;
        if data[len_at] as usize != key_len {
            continue;
        }
        let ciphertext_len = len_at - BLOCK_IV_SIZE;
        if ciphertext_len == 0 || ciphertext_len % CIPHER_BLOCK_SIZE != 0 {
            continue;
        }
        let Ok(key_id) = std::str::from_utf8(&data[len_at + 1..]) else {
            continue;
        };
        return Ok(KeyedEnvelope {
            iv: data[..BLOCK_IV_SIZE].to_vec(),
            ciphertext: data[BLOCK_IV_SIZE..len_at].to_vec(),
            key_id: key_id.to_string(),
        });
    }

    Err(CryptoError::MalformedEnvelope(
        "no consistent key id trailer found".into(),
    ))
}
