// src/format/mod.rs
//! Binary envelope codec for encrypted blobs
//!
//! Canonical layout (version 2), the only one `pack` writes:
//!
//! ```text
//! "CENV" | version | algorithm | flags | iv_len | [kr_len | key_ref] | iv | ciphertext | [tag]
//!   4         1          1         1        1         1      kr_len     iv_len               16
//! ```
//!
//! `flags` bit 0 marks a trailing tag, bit 1 an embedded key reference.
//! Version 1 blobs (`"CENV" | 1 | iv(16) | ciphertext | [tag]`) and the
//! magic-less keyed layout in [`keyed`] are read-only. The keyed layout has
//! no magic of its own, so [`decode`] reads it only when asked to.

pub mod keyed;

pub use keyed::{pack_keyed, unpack_keyed, KeyedEnvelope};

use crate::consts::{
    BLOCK_IV_SIZE, CIPHER_BLOCK_SIZE, ENVELOPE_FIXED_HEADER, ENVELOPE_MAGIC,
    ENVELOPE_VERSION_CURRENT, ENVELOPE_VERSION_LEGACY, TAG_SIZE,
};
use crate::enums::EncryptionAlgorithm;
use crate::error::{CryptoError, OperationResult};

const FLAG_TAG: u8 = 0b0000_0001;
const FLAG_KEY_REF: u8 = 0b0000_0010;
const KNOWN_FLAGS: u8 = FLAG_TAG | FLAG_KEY_REF;

/// Version reported for blobs decoded from the keyed legacy layout
pub const KEYED_LAYOUT_VERSION: u8 = 0;

/// Decoded view of an encrypted blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: u8,
    /// `None` only for version 1 blobs whose algorithm cannot be inferred
    pub algorithm: Option<EncryptionAlgorithm>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Option<Vec<u8>>,
    pub key_reference: Option<String>,
}

impl Envelope {
    pub fn new(
        algorithm: EncryptionAlgorithm,
        iv: Vec<u8>,
        ciphertext: Vec<u8>,
        tag: Option<Vec<u8>>,
    ) -> Self {
        Self {
            version: ENVELOPE_VERSION_CURRENT,
            algorithm: Some(algorithm),
            iv,
            ciphertext,
            tag,
            key_reference: None,
        }
    }

    pub fn with_key_reference(mut self, key_id: impl Into<String>) -> Self {
        self.key_reference = Some(key_id.into());
        self
    }
}

fn malformed(reason: impl Into<String>) -> CryptoError {
    CryptoError::MalformedEnvelope(reason.into())
}

/// Serialise an envelope in the canonical layout
pub fn pack(envelope: &Envelope) -> OperationResult<Vec<u8>> {
    let algorithm = envelope
        .algorithm
        .ok_or_else(|| CryptoError::InvalidInput("envelope algorithm is required".into()))?;
    if envelope.iv.len() != algorithm.iv_len() {
        return Err(CryptoError::InvalidInput(format!(
            "{algorithm} needs a {}-byte IV, got {}",
            algorithm.iv_len(),
            envelope.iv.len()
        )));
    }
    match (&envelope.tag, algorithm.is_authenticated()) {
        (Some(tag), true) if tag.len() == TAG_SIZE => {}
        (None, false) => {}
        (Some(tag), true) => {
            return Err(CryptoError::InvalidInput(format!(
                "tag must be {TAG_SIZE} bytes, got {}",
                tag.len()
            )))
        }
        (None, true) => {
            return Err(CryptoError::InvalidInput(format!(
                "{algorithm} output requires a tag"
            )))
        }
        (Some(_), false) => {
            return Err(CryptoError::InvalidInput(format!(
                "{algorithm} output carries no tag"
            )))
        }
    }

    let mut flags = 0u8;
    if envelope.tag.is_some() {
        flags |= FLAG_TAG;
    }
    let key_ref = match &envelope.key_reference {
        Some(key_id) => {
            if key_id.is_empty() || key_id.len() > u8::MAX as usize {
                return Err(CryptoError::InvalidInput(format!(
                    "key reference must be 1..=255 bytes, got {}",
                    key_id.len()
                )));
            }
            flags |= FLAG_KEY_REF;
            Some(key_id.as_bytes())
        }
        None => None,
    };

    let mut out = Vec::with_capacity(
        ENVELOPE_FIXED_HEADER
            + key_ref.map_or(0, |k| k.len() + 1)
            + envelope.iv.len()
            + envelope.ciphertext.len()
            + TAG_SIZE,
    );
    out.extend_from_slice(ENVELOPE_MAGIC);
    out.push(ENVELOPE_VERSION_CURRENT);
    out.push(algorithm.id());
    out.push(flags);
    out.push(envelope.iv.len() as u8);
    if let Some(key_ref) = key_ref {
        out.push(key_ref.len() as u8);
        out.extend_from_slice(key_ref);
    }
    out.extend_from_slice(&envelope.iv);
    out.extend_from_slice(&envelope.ciphertext);
    if let Some(tag) = &envelope.tag {
        out.extend_from_slice(tag);
    }
    Ok(out)
}

/// Parse a blob that starts with the envelope magic
pub fn unpack(data: &[u8]) -> OperationResult<Envelope> {
    if data.len() < ENVELOPE_MAGIC.len() + 1 {
        return Err(malformed(format!("{} bytes is shorter than any header", data.len())));
    }
    if &data[..ENVELOPE_MAGIC.len()] != ENVELOPE_MAGIC {
        return Err(malformed("magic bytes mismatch"));
    }
    match data[ENVELOPE_MAGIC.len()] {
        ENVELOPE_VERSION_LEGACY => unpack_v1(&data[ENVELOPE_MAGIC.len() + 1..]),
        ENVELOPE_VERSION_CURRENT => unpack_v2(data),
        version => Err(malformed(format!(
            "unsupported envelope version {version} (highest known is {ENVELOPE_VERSION_CURRENT})"
        ))),
    }
}

/// Version 1 has no flags; tag presence is inferred from the remainder
/// length. CBC output is always a whole number of blocks, so a remainder
/// that is not block-aligned and longer than a tag is read as ciphertext||tag.
fn unpack_v1(body: &[u8]) -> OperationResult<Envelope> {
    if body.len() < BLOCK_IV_SIZE {
        return Err(malformed("version 1 envelope shorter than header + IV"));
    }
    let (iv, rest) = body.split_at(BLOCK_IV_SIZE);
    let (ciphertext, tag) = if rest.len() > TAG_SIZE && rest.len() % CIPHER_BLOCK_SIZE != 0 {
        let (ct, tag) = rest.split_at(rest.len() - TAG_SIZE);
        (ct, Some(tag.to_vec()))
    } else {
        (rest, None)
    };
    Ok(Envelope {
        version: ENVELOPE_VERSION_LEGACY,
        algorithm: tag.is_none().then_some(EncryptionAlgorithm::Aes256Cbc),
        iv: iv.to_vec(),
        ciphertext: ciphertext.to_vec(),
        tag,
        key_reference: None,
    })
}

fn unpack_v2(data: &[u8]) -> OperationResult<Envelope> {
    if data.len() < ENVELOPE_FIXED_HEADER {
        return Err(malformed("envelope shorter than fixed header"));
    }
    let algorithm = EncryptionAlgorithm::from_id(data[5])
        .ok_or_else(|| malformed(format!("unknown algorithm id {}", data[5])))?;
    let flags = data[6];
    if flags & !KNOWN_FLAGS != 0 {
        return Err(malformed(format!("unknown flag bits {flags:#010b}")));
    }
    let iv_len = data[7] as usize;
    if iv_len != algorithm.iv_len() {
        return Err(malformed(format!(
            "IV length {iv_len} does not match {algorithm}"
        )));
    }
    let has_tag = flags & FLAG_TAG != 0;
    if has_tag != algorithm.is_authenticated() {
        return Err(malformed(format!("tag flag inconsistent with {algorithm}")));
    }

    let mut rest = &data[ENVELOPE_FIXED_HEADER..];
    let key_reference = if flags & FLAG_KEY_REF != 0 {
        let (&len, tail) = rest
            .split_first()
            .ok_or_else(|| malformed("missing key reference length"))?;
        let len = len as usize;
        if len == 0 || tail.len() < len {
            return Err(malformed("key reference length out of range"));
        }
        let (key_ref, tail) = tail.split_at(len);
        rest = tail;
        Some(
            String::from_utf8(key_ref.to_vec())
                .map_err(|_| malformed("key reference is not UTF-8"))?,
        )
    } else {
        None
    };

    let tag_len = if has_tag { TAG_SIZE } else { 0 };
    if rest.len() < iv_len + tag_len {
        return Err(malformed("envelope shorter than header + IV"));
    }
    let (iv, rest) = rest.split_at(iv_len);
    let (ciphertext, tag) = rest.split_at(rest.len() - tag_len);

    Ok(Envelope {
        version: ENVELOPE_VERSION_CURRENT,
        algorithm: Some(algorithm),
        iv: iv.to_vec(),
        ciphertext: ciphertext.to_vec(),
        tag: has_tag.then(|| tag.to_vec()),
        key_reference,
    })
}

/// Decode any layout Decrypt accepts
///
/// Magic-prefixed blobs go through [`unpack`]. A blob without the magic is
/// read as the keyed legacy layout when `accept_keyed` is set and is
/// `MalformedEnvelope` otherwise.
pub fn decode(data: &[u8], accept_keyed: bool) -> OperationResult<Envelope> {
    if data.starts_with(ENVELOPE_MAGIC) {
        return unpack(data);
    }
    if !accept_keyed {
        return Err(malformed("missing envelope magic"));
    }
    let keyed = unpack_keyed(data)?;
    Ok(Envelope {
        version: KEYED_LAYOUT_VERSION,
        algorithm: Some(EncryptionAlgorithm::Aes256Cbc),
        iv: keyed.iv,
        ciphertext: keyed.ciphertext,
        tag: None,
        key_reference: Some(keyed.key_id),
    })
}
