// tests/engine_tests.rs
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crypto_ops::aliases::ExposeSecret;
use crypto_ops::commands::{
    DataSource, DecryptOptions, DeriveKeyOptions, EncryptOptions, GenerateKeyOptions, HashOptions,
};
use crypto_ops::engine::{
    BuiltinEngineLoader, CryptoEngine, EngineLoader, EngineRegistry, ProxyState, FALLBACK_TAG,
};
use crypto_ops::enums::{EncryptionAlgorithm, EngineType, ExportEncoding, KeyType};
use crypto_ops::error::{CryptoError, ErrorKind};
use crypto_ops::logging::LogLevel;
use crypto_ops::CryptoServices;
use support::TestEnv;

fn not_implemented<T>(result: Result<T, CryptoError>) -> bool {
    matches!(result, Err(CryptoError::OperationNotImplemented { .. }))
}

#[tokio::test]
async fn test_proxy_is_deferred_until_first_use() {
    let env = TestEnv::new();
    let registry = EngineRegistry::new(env.services.clone());
    let engine = registry.select(EngineType::Standard);
    assert_eq!(engine.state(), ProxyState::Deferred);
    assert_eq!(engine.requested(), EngineType::Standard);

    engine
        .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
        .await
        .unwrap();
    assert_eq!(engine.state(), ProxyState::Bound(EngineType::Standard));
    assert!(!engine.is_fallback());
}

#[tokio::test]
async fn test_each_engine_type_resolves_to_what_was_asked_for() {
    let env = TestEnv::new();
    let registry = EngineRegistry::new(env.services.clone());
    for engine_type in [
        EngineType::Standard,
        EngineType::Portable,
        EngineType::PlatformAccelerated,
    ] {
        let proxy = registry.select(engine_type);
        let delegate = proxy.resolve().await;
        assert_eq!(delegate.engine_type(), engine_type);
    }
}

#[tokio::test]
async fn test_fallback_refuses_crypto_but_passes_storage_through() {
    let env = TestEnv::new();
    let registry = EngineRegistry::new(env.services.clone());
    let engine = registry.select(EngineType::PlatformAccelerated);

    assert!(not_implemented(
        engine
            .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
            .await
    ));
    assert_eq!(engine.state(), ProxyState::Fallback);
    assert!(engine.is_fallback());

    assert!(not_implemented(
        engine
            .encrypt(b"x".to_vec().into(), "k", EncryptOptions::default())
            .await
    ));
    assert!(not_implemented(
        engine.decrypt("c", DecryptOptions::with_key("k")).await
    ));
    assert!(not_implemented(
        engine.hash(b"x".to_vec().into(), HashOptions::default()).await
    ));
    assert!(not_implemented(
        engine
            .verify_hash(b"x".to_vec().into(), &[0u8; 32], HashOptions::default())
            .await
    ));
    assert!(not_implemented(
        engine
            .derive_key("k", DeriveKeyOptions::new(KeyType::Aes256))
            .await
    ));

    let id = engine.import_data(b"opaque".to_vec(), None).await.unwrap();
    assert_eq!(
        engine.export_data(&id, ExportEncoding::Raw).await.unwrap(),
        b"opaque"
    );
    engine.store_data(b"more", "named").await.unwrap();
    assert_eq!(engine.retrieve_data("named").await.unwrap(), b"more");
    engine.delete_data("named").await.unwrap();
    assert_eq!(
        engine.retrieve_data("named").await.err().map(|e| e.kind()),
        Some(ErrorKind::DataNotFound)
    );

    // nothing was generated or encrypted behind the caller's back
    assert_eq!(env.storage.len(), 1);
}

#[tokio::test]
async fn test_fallback_is_tagged_in_logs() {
    let env = TestEnv::new();
    let engine = EngineRegistry::new(env.services.clone()).select(EngineType::PlatformAccelerated);
    let _ = engine.hash(b"x".to_vec().into(), HashOptions::default()).await;

    let warnings = env.logger.at_level(LogLevel::Warning);
    assert!(warnings.len() >= 2, "bind and refusal should both warn");
    assert!(warnings
        .iter()
        .all(|line| line.message.contains(FALLBACK_TAG)));
}

#[tokio::test]
async fn test_portable_profile_limits_algorithms() {
    let env = TestEnv::new();
    let engine = EngineRegistry::new(env.services.clone()).select(EngineType::Portable);
    let key = engine
        .generate_key(GenerateKeyOptions::new(KeyType::ChaCha20))
        .await
        .unwrap();

    let cbc = engine
        .encrypt(
            b"x".to_vec().into(),
            &key.identifier,
            EncryptOptions::with_algorithm(EncryptionAlgorithm::Aes256Cbc),
        )
        .await;
    assert!(matches!(cbc, Err(CryptoError::UnsupportedOperation(_))));

    // default is ChaCha20-Poly1305, algorithm id 3 in the envelope header
    let envelope_id = engine
        .encrypt(b"x".to_vec().into(), &key.identifier, EncryptOptions::default())
        .await
        .unwrap();
    let blob = engine.retrieve_data(&envelope_id).await.unwrap();
    assert_eq!(blob[5], EncryptionAlgorithm::ChaCha20Poly1305.id());
}

#[tokio::test]
async fn test_engines_share_storage_and_envelopes() {
    let env = TestEnv::new();
    let registry = EngineRegistry::new(env.services.clone());
    let standard = registry.select(EngineType::Standard);
    let portable = registry.select(EngineType::Portable);

    let key = standard
        .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
        .await
        .unwrap();
    let envelope_id = standard
        .encrypt(
            DataSource::Bytes(b"shared".to_vec()),
            &key.identifier,
            EncryptOptions::with_algorithm(EncryptionAlgorithm::Aes256Gcm),
        )
        .await
        .unwrap();
    let plain = portable
        .decrypt(&envelope_id, DecryptOptions::with_key(key.identifier.as_str()))
        .await
        .unwrap();
    assert_eq!(plain.expose_secret(), b"shared");
}

/// Loader that counts constructions and is slow enough for callers to race
struct CountingLoader {
    builds: AtomicUsize,
}

#[async_trait]
impl EngineLoader for CountingLoader {
    async fn load(
        &self,
        engine_type: EngineType,
        services: &CryptoServices,
    ) -> Option<Arc<dyn CryptoEngine>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        BuiltinEngineLoader.load(engine_type, services).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_constructs_once() {
    let env = TestEnv::new();
    let loader = Arc::new(CountingLoader {
        builds: AtomicUsize::new(0),
    });
    let registry = EngineRegistry::with_loader(env.services.clone(), loader.clone());
    let engine = Arc::new(registry.select(EngineType::Standard));

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .import_data(vec![i as u8], Some(format!("blob-{i}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(loader.builds.load(Ordering::SeqCst), 1);
    assert_eq!(env.storage.len(), 16);

    // later calls reuse the cached delegate
    engine.retrieve_data("blob-3").await.unwrap();
    assert_eq!(loader.builds.load(Ordering::SeqCst), 1);
}

/// Loader with no engines at all
struct EmptyLoader;

#[async_trait]
impl EngineLoader for EmptyLoader {
    async fn load(&self, _: EngineType, _: &CryptoServices) -> Option<Arc<dyn CryptoEngine>> {
        None
    }
}

#[tokio::test]
async fn test_registry_builds_nothing_its_loader_does_not_provide() {
    let env = TestEnv::new();
    let registry = EngineRegistry::with_loader(env.services.clone(), Arc::new(EmptyLoader));
    for engine_type in [EngineType::Standard, EngineType::Portable] {
        let engine = registry.select(engine_type);
        assert!(not_implemented(
            engine
                .generate_key(GenerateKeyOptions::new(KeyType::Aes256))
                .await
        ));
        assert_eq!(engine.state(), ProxyState::Fallback);
        assert_eq!(engine.resolve().await.engine_type(), engine_type);
    }
    assert!(env.storage.is_empty());
}

#[tokio::test]
async fn test_separate_proxies_build_separate_delegates() {
    let env = TestEnv::new();
    let loader = Arc::new(CountingLoader {
        builds: AtomicUsize::new(0),
    });
    let registry = EngineRegistry::with_loader(env.services.clone(), loader.clone());

    registry.select(EngineType::Standard).resolve().await;
    registry.select(EngineType::Standard).resolve().await;
    assert_eq!(loader.builds.load(Ordering::SeqCst), 2);
}
