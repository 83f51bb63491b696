// src/aliases.rs
//! Secret byte wrappers
//!
//! Both are boxed slices that zeroize on drop and redact themselves in
//! `Debug` output. Read access goes through [`ExposeSecret`].

pub use secrecy::{ExposeSecret, SecretSlice};

pub type KeyMaterial = SecretSlice<u8>; // key bytes as read from storage
pub type PlainText = SecretSlice<u8>; // decrypted payloads handed back to callers
