//! Memory adapter: in-process collections, nothing persisted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::config::StoreConfig;
use crate::error::ResourceError;
use crate::stores::adapter::{
    AdapterKind, ModelDefinition, ModelHandle, SessionConnector, StoreAdapter,
};

/// Constructor registered for [`AdapterKind::Memory`].
pub fn make_store(config: &StoreConfig) -> Result<Arc<dyn StoreAdapter>, ResourceError> {
    Ok(Arc::new(MemoryStore::new(&config.name)))
}

#[derive(Debug)]
pub struct MemoryStore {
    store_name: String,
    collections: DashMap<String, Vec<serde_json::Value>>,
    open: AtomicBool,
}

impl MemoryStore {
    pub fn new(store_name: &str) -> Self {
        Self {
            store_name: store_name.to_string(),
            collections: DashMap::new(),
            open: AtomicBool::new(false),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Memory
    }

    async fn start(&self) -> Result<(), ResourceError> {
        self.open.store(true, Ordering::Release);
        tracing::debug!(store = %self.store_name, "memory store opened");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ResourceError> {
        self.collections.clear();
        self.open.store(false, Ordering::Release);
        tracing::debug!(store = %self.store_name, "memory store dropped");
        Ok(())
    }

    fn add_model(
        &self,
        definition: &ModelDefinition,
        _context_user: &str,
    ) -> Result<ModelHandle, ResourceError> {
        self.collections
            .entry(definition.identity.clone())
            .or_default();

        Ok(ModelHandle {
            identity: definition.identity.clone(),
            global_id: definition.effective_global_id(),
            store: self.store_name.clone(),
            kind: AdapterKind::Memory,
        })
    }

    fn session_connector(&self) -> SessionConnector {
        SessionConnector::Memory
    }
}
