// src/engine/loader.rs
use std::sync::Arc;

use async_trait::async_trait;

use super::{CryptoEngine, EngineLoader, EngineRegistry, PortableEngine, StandardEngine};
use crate::enums::EngineType;
use crate::services::CryptoServices;

/// Loader for the engines compiled into this crate
///
/// There is no platform-accelerated implementation here, so that type
/// always resolves to the fallback engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEngineLoader;

#[async_trait]
impl EngineLoader for BuiltinEngineLoader {
    async fn load(
        &self,
        engine_type: EngineType,
        services: &CryptoServices,
    ) -> Option<Arc<dyn CryptoEngine>> {
        match engine_type {
            EngineType::Standard => Some(Arc::new(StandardEngine::new(services.clone()))),
            EngineType::Portable => Some(Arc::new(PortableEngine::new(services.clone()))),
            EngineType::PlatformAccelerated => None,
        }
    }
}

impl EngineRegistry {
    /// Registry over the built-in engines
    pub fn new(services: CryptoServices) -> Self {
        Self::with_loader(services, Arc::new(BuiltinEngineLoader))
    }
}
