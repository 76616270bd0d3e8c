//! Store instance cache and sweep driver.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{ConfigurationError, LifecycleError, ResourceError};
use crate::stores::adapter::{AdapterRegistry, SessionConnector, StoreAdapter};

/// A cached, named store.
#[derive(Debug)]
pub struct StoreInstance {
    name: String,
    adapter: Arc<dyn StoreAdapter>,
    started: AtomicBool,
}

impl StoreInstance {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter(&self) -> &Arc<dyn StoreAdapter> {
        &self.adapter
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub async fn start(&self) -> Result<(), ResourceError> {
        self.adapter.start().await?;
        self.started.store(true, Ordering::Release);
        tracing::info!(store = %self.name, adapter = %self.adapter.kind(), "store started");
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), ResourceError> {
        self.adapter.stop().await?;
        self.started.store(false, Ordering::Release);
        tracing::info!(store = %self.name, "store stopped");
        Ok(())
    }
}

/// Resolves store names to live adapter instances and caches them.
pub struct StoreManager {
    adapters: AdapterRegistry,
    /// BTreeMap so the start/stop sweeps run in a deterministic order.
    cache: Mutex<BTreeMap<String, Arc<StoreInstance>>>,
}

impl StoreManager {
    pub fn new(adapters: AdapterRegistry) -> Self {
        Self {
            adapters,
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// Resolve `name` to a store, reusing the cached instance when one
    /// exists.
    ///
    /// A missing `stores.<name>` entry, an unknown adapter id, or a
    /// failing adapter constructor are all fatal here; boot must not
    /// continue with a hole where a store should be.
    pub async fn get_store(
        &self,
        config: &Config,
        name: &str,
    ) -> Result<Arc<StoreInstance>, LifecycleError> {
        let mut cache = self.cache.lock().await;
        if let Some(instance) = cache.get(name) {
            return Ok(Arc::clone(instance));
        }

        let store_config = config
            .store(name)
            .ok_or_else(|| ConfigurationError::MissingStore(name.to_string()))?;

        let adapter = self.adapters.resolve(&store_config)?;

        let instance = Arc::new(StoreInstance {
            name: name.to_string(),
            adapter,
            started: AtomicBool::new(false),
        });
        cache.insert(name.to_string(), Arc::clone(&instance));
        tracing::debug!(store = %name, adapter = %store_config.adapter, "store instantiated");

        Ok(instance)
    }

    /// The cached instance for `name`, if any. No side effects.
    pub async fn get_cached(&self, name: &str) -> Option<Arc<StoreInstance>> {
        self.cache.lock().await.get(name).cloned()
    }

    /// Start every cached store, strictly sequentially.
    pub async fn start_all(&self) -> Result<(), ResourceError> {
        let instances: Vec<_> = self.cache.lock().await.values().cloned().collect();
        for instance in instances {
            instance.start().await?;
        }
        Ok(())
    }

    /// Stop every cached store, strictly sequentially.
    pub async fn stop_all(&self) -> Result<(), ResourceError> {
        let instances: Vec<_> = self.cache.lock().await.values().cloned().collect();
        for instance in instances {
            instance.stop().await?;
        }
        Ok(())
    }

    /// Discard all cached instances. Stores must already be stopped; a
    /// reload rebuilds fresh instances from configuration.
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }

    /// Session connector of a named store, if that store is cached.
    pub async fn session_connector(&self, name: &str) -> Option<SessionConnector> {
        self.get_cached(name)
            .await
            .map(|instance| instance.adapter.session_connector())
    }
}

impl Default for StoreManager {
    fn default() -> Self {
        Self::new(AdapterRegistry::builtin())
    }
}
