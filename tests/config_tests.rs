// tests/config_tests.rs
use std::fs;

use crypto_ops::config::{self, StorageBackend};
use crypto_ops::consts::{CONFIG_ENV_VAR, DEFAULT_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use crypto_ops::enums::{HashAlgorithm, KdfAlgorithm};
use crypto_ops::error::CryptoError;
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn test_empty_toml_gives_defaults() {
    let conf = config::from_toml_str("").unwrap();
    assert_eq!(conf.kdf.iterations, DEFAULT_KDF_ITERATIONS);
    assert_eq!(conf.kdf.min_iterations, MIN_KDF_ITERATIONS);
    assert!(!conf.kdf.allow_below_minimum);
    assert_eq!(conf.kdf.default_algorithm, KdfAlgorithm::HkdfSha256);
    assert_eq!(conf.hashing.fallback_algorithm, HashAlgorithm::Sha256);
    assert_eq!(conf.storage.backend, StorageBackend::Memory);
}

#[test]
fn test_partial_sections_override_defaults() {
    let conf = config::from_toml_str(
        r#"
        [kdf]
        default_algorithm = "pbkdf2-sha512"
        iterations = 250000

        [hashing]
        fallback_algorithm = "blake3"

        [storage]
        backend = "sqlite"
        sqlite_path = "/tmp/crypto-ops-test.db"
        "#,
    )
    .unwrap();
    assert_eq!(conf.kdf.default_algorithm, KdfAlgorithm::Pbkdf2Sha512);
    assert_eq!(conf.kdf.iterations, 250_000);
    assert_eq!(conf.kdf.salt_length, 16);
    assert_eq!(conf.hashing.fallback_algorithm, HashAlgorithm::Blake3);
    assert_eq!(conf.storage.backend, StorageBackend::Sqlite);
}

#[test]
fn test_invalid_values_are_config_errors() {
    for toml in [
        "[kdf]\nsalt_length = 0",
        "[kdf]\nmin_iterations = 0",
        "[hashing]\nfallback_algorithm = \"hmac-sha256\"",
        "[hashing]\nfallback_algorithm = \"md5\"",
        "[kdf]\niterations = \"lots\"",
    ] {
        assert!(
            matches!(config::from_toml_str(toml), Err(CryptoError::Config(_))),
            "accepted: {toml}"
        );
    }
}

#[test]
#[serial]
fn test_load_reads_file_named_by_env_var() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ops.toml");
    fs::write(&path, "[kdf]\nallow_below_minimum = true\n").unwrap();

    std::env::set_var(CONFIG_ENV_VAR, &path);
    let conf = config::load();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert!(conf.unwrap().kdf.allow_below_minimum);
}

#[test]
#[serial]
fn test_load_without_file_uses_defaults() {
    let dir = tempdir().unwrap();
    std::env::set_var(CONFIG_ENV_VAR, dir.path().join("missing.toml"));
    let conf = config::load();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(conf.unwrap().kdf.iterations, DEFAULT_KDF_ITERATIONS);
}
