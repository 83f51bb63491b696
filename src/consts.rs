// src/consts.rs
//! Shared constants: security parameters and envelope layout

/// Magic bytes opening every envelope written by this crate
pub const ENVELOPE_MAGIC: &[u8; 4] = b"CENV";

/// Header-only envelope version: IV(16) + ciphertext + optional tag, no flags
pub const ENVELOPE_VERSION_LEGACY: u8 = 1;

/// Envelope version written by `format::pack`
pub const ENVELOPE_VERSION_CURRENT: u8 = 2;

/// Authentication tag length for every supported AEAD (128 bits)
pub const TAG_SIZE: usize = 16;

/// IV length for block-cipher modes and for legacy envelopes
pub const BLOCK_IV_SIZE: usize = 16;

/// Nonce length for the AEAD modes
pub const AEAD_NONCE_SIZE: usize = 12;

/// Cipher block size, used when inferring tag presence in legacy envelopes
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Smallest canonical envelope: magic + version + algorithm + flags + iv_len
pub const ENVELOPE_FIXED_HEADER: usize = ENVELOPE_MAGIC.len() + 4;

/// Smallest byte string Decrypt will attempt to parse
pub const MIN_ENVELOPE_SIZE: usize = ENVELOPE_FIXED_HEADER + AEAD_NONCE_SIZE;

/// Lower bound on PBKDF2-style iterations unless explicitly overridden
pub const MIN_KDF_ITERATIONS: u32 = 10_000;

/// Iterations used when the caller does not choose
// ~50ms on a modern core for HMAC-SHA-256
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Size of salts generated when a derivation request carries none
pub const DEFAULT_SALT_SIZE: usize = 16;

/// HKDF expand counter is a single byte
pub const MAX_EXPAND_BLOCKS: usize = 255;

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "CRYPTO_OPS_CONFIG";

/// Config file read when `CONFIG_ENV_VAR` is unset
pub const DEFAULT_CONFIG_FILE: &str = "crypto-ops.toml";

/// Rendering used for private log values
pub const REDACTED: &str = "<private>";
