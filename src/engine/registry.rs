// src/engine/registry.rs
use std::sync::Arc;

use async_trait::async_trait;

use super::{CryptoEngine, EngineProxy};
use crate::enums::EngineType;
use crate::services::CryptoServices;

/// Produces concrete engines for the proxy
///
/// Returning `None` means no implementation of that type is available; the
/// proxy then binds the fallback engine.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(
        &self,
        engine_type: EngineType,
        services: &CryptoServices,
    ) -> Option<Arc<dyn CryptoEngine>>;
}

/// Selects engines by explicit type; there is no default engine
#[derive(Clone)]
pub struct EngineRegistry {
    services: CryptoServices,
    loader: Arc<dyn EngineLoader>,
}

// engines reach the registry only through its loader; `new` lives in loader.rs
impl EngineRegistry {
    pub fn with_loader(services: CryptoServices, loader: Arc<dyn EngineLoader>) -> Self {
        Self { services, loader }
    }

    pub fn services(&self) -> &CryptoServices {
        &self.services
    }

    /// Returns immediately; the engine itself is built on first use
    pub fn select(&self, engine_type: EngineType) -> EngineProxy {
        EngineProxy::new(engine_type, self.services.clone(), Arc::clone(&self.loader))
    }
}
