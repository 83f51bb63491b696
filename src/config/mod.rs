// src/config/mod.rs
//! Configuration system for crypto-ops
//!
//! TOML file + env override, loaded on demand and passed explicitly to the
//! registry and engines. Nothing here is process-global.

pub use app::{
    from_toml_str, load, load_from_path, CryptoConfig, HashSettings, KdfSettings, StorageBackend,
    StorageSettings,
};

mod app;
pub mod defaults;
