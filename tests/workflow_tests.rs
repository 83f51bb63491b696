// tests/workflow_tests.rs
//! End-to-end flows through the registry and a real engine

mod common;
mod support;

use crypto_ops::aliases::ExposeSecret;
use crypto_ops::commands::{
    DataSource, DecryptOptions, DeriveKeyOptions, EncryptOptions, GenerateKeyOptions, HashOptions,
};
use crypto_ops::engine::{CryptoEngine, EngineProxy, EngineRegistry};
use crypto_ops::enums::{EngineType, HashAlgorithm, KdfAlgorithm, KeyType};
use crypto_ops::error::CryptoError;
use crypto_ops::format;
use crypto_ops::SecureStorage;
use support::TestEnv;

fn standard(env: &TestEnv) -> EngineProxy {
    common::setup();
    EngineRegistry::new(env.services.clone()).select(EngineType::Standard)
}

#[tokio::test]
async fn test_generate_encrypt_decrypt() {
    let env = TestEnv::new();
    let engine = standard(&env);

    let key = engine
        .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
        .await
        .unwrap();
    assert_eq!(key.bit_length, 256);

    let envelope_id = engine
        .encrypt(DataSource::Bytes(b"hello".to_vec()), &key.identifier, EncryptOptions::default())
        .await
        .unwrap();
    let plain = engine
        .decrypt(&envelope_id, DecryptOptions::with_key(key.identifier.as_str()))
        .await
        .unwrap();
    assert_eq!(plain.expose_secret(), b"hello");
}

#[tokio::test]
async fn test_encrypt_stored_plaintext_to_chosen_identifier() {
    let env = TestEnv::new();
    let engine = standard(&env);
    let key = engine
        .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
        .await
        .unwrap();
    let data_id = engine.import_data(b"stored plaintext".to_vec(), None).await.unwrap();

    let options = EncryptOptions {
        output_id: Some("cipher-1".into()),
        ..EncryptOptions::default()
    };
    let envelope_id = engine
        .encrypt(DataSource::id(data_id.as_str()), &key.identifier, options)
        .await
        .unwrap();
    assert_eq!(envelope_id, "cipher-1");
    // the plaintext blob is left in place
    assert!(env.storage.contains(&data_id));

    let plain = engine
        .decrypt("cipher-1", DecryptOptions::with_key(key.identifier.as_str()))
        .await
        .unwrap();
    assert_eq!(plain.expose_secret(), b"stored plaintext");
}

#[tokio::test]
async fn test_derive_with_captured_salt_is_reproducible() {
    let env = TestEnv::new();
    let engine = standard(&env);
    let source = engine
        .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
        .await
        .unwrap();

    let first = engine
        .derive_key(&source.identifier, DeriveKeyOptions::new(KeyType::Aes256))
        .await
        .unwrap();
    assert_eq!(first.salt.len(), 16);
    assert_eq!(first.algorithm, KdfAlgorithm::HkdfSha256);

    let same = engine
        .derive_key(
            &source.identifier,
            DeriveKeyOptions::new(KeyType::Aes256).with_salt(first.salt.clone()),
        )
        .await
        .unwrap();
    let different = engine
        .derive_key(
            &source.identifier,
            DeriveKeyOptions::new(KeyType::Aes256).with_salt(vec![0xab; 16]),
        )
        .await
        .unwrap();

    let first_bytes = env.storage.retrieve(&first.descriptor.identifier).await.unwrap();
    let same_bytes = env.storage.retrieve(&same.descriptor.identifier).await.unwrap();
    let different_bytes = env
        .storage
        .retrieve(&different.descriptor.identifier)
        .await
        .unwrap();
    assert_eq!(first_bytes, same_bytes);
    assert_ne!(first_bytes, different_bytes);
    assert_ne!(first.descriptor.identifier, same.descriptor.identifier);
}

#[tokio::test]
async fn test_derived_key_encrypts() {
    let env = TestEnv::new();
    let engine = standard(&env);
    let source = engine
        .generate_key(GenerateKeyOptions::new(KeyType::Generic).with_length(64))
        .await
        .unwrap();
    let mut options = DeriveKeyOptions::new(KeyType::Aes256)
        .with_kdf(KdfAlgorithm::Pbkdf2Sha256)
        .with_info(b"ignored by pbkdf2".to_vec());
    options.target_id = Some("derived".into());
    let derived = engine.derive_key(&source.identifier, options).await.unwrap();
    assert_eq!(derived.descriptor.identifier, "derived");

    let envelope_id = engine
        .encrypt(b"via derived".to_vec().into(), "derived", EncryptOptions::default())
        .await
        .unwrap();
    let plain = engine
        .decrypt(&envelope_id, DecryptOptions::with_key("derived"))
        .await
        .unwrap();
    assert_eq!(plain.expose_secret(), b"via derived");
}

#[tokio::test]
async fn test_hash_then_verify() {
    let env = TestEnv::new();
    let engine = standard(&env);
    let options = HashOptions::new(HashAlgorithm::Sha256);

    let digest = engine.hash(b"abc".to_vec().into(), options.clone()).await.unwrap();
    assert!(engine
        .verify_hash(b"abc".to_vec().into(), &digest, options.clone())
        .await
        .unwrap());
    assert!(!engine
        .verify_hash(b"abd".to_vec().into(), &digest, options)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_corrupted_envelope_byte_zero() {
    let env = TestEnv::new();
    let engine = standard(&env);
    let key = engine
        .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
        .await
        .unwrap();
    let envelope_id = engine
        .encrypt(b"hello".to_vec().into(), &key.identifier, EncryptOptions::default())
        .await
        .unwrap();

    let mut blob = engine.retrieve_data(&envelope_id).await.unwrap();
    blob[0] ^= 0x01;
    assert!(matches!(
        format::unpack(&blob),
        Err(CryptoError::MalformedEnvelope(_))
    ));
    engine.store_data(&blob, &envelope_id).await.unwrap();
    let result = engine
        .decrypt(&envelope_id, DecryptOptions::with_key(key.identifier.as_str()))
        .await;
    assert!(matches!(result.err(), Some(CryptoError::MalformedEnvelope(_))));
}

#[tokio::test]
async fn test_corrupted_magic_never_reaches_the_key_lookup() {
    let env = TestEnv::new();
    let engine = standard(&env);
    let key = engine
        .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
        .await
        .unwrap();

    for round in 0..64u8 {
        let options = EncryptOptions {
            embed_key_reference: true,
            ..EncryptOptions::default()
        };
        let envelope_id = engine
            .encrypt(vec![round; 5].into(), &key.identifier, options)
            .await
            .unwrap();
        let mut blob = engine.retrieve_data(&envelope_id).await.unwrap();
        blob[0] ^= 0x01;
        engine.store_data(&blob, &envelope_id).await.unwrap();

        // no caller key: a misread trailer would surface as KeyNotFound
        let result = engine.decrypt(&envelope_id, DecryptOptions::default()).await;
        assert!(
            matches!(result.err(), Some(CryptoError::MalformedEnvelope(_))),
            "round {round}"
        );
    }
}

#[tokio::test]
async fn test_rsa_generation_is_unsupported_and_writes_nothing() {
    let env = TestEnv::new();
    let engine = standard(&env);
    for key_type in [KeyType::Rsa2048, KeyType::Rsa4096, KeyType::EcP256] {
        let result = engine.generate_key(GenerateKeyOptions::new(key_type)).await;
        assert!(matches!(result, Err(CryptoError::UnsupportedOperation(_))));
    }
    assert!(env.storage.is_empty());
}
