//! Disk adapter: collections as JSON files under a data directory.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::error::ResourceError;
use crate::stores::adapter::{
    AdapterKind, ModelDefinition, ModelHandle, SessionConnector, StoreAdapter,
};

/// Constructor registered for [`AdapterKind::Disk`].
pub fn make_store(config: &StoreConfig) -> Result<Arc<dyn StoreAdapter>, ResourceError> {
    Ok(Arc::new(DiskStore::from_config(config)?))
}

#[derive(Debug)]
pub struct DiskStore {
    store_name: String,
    location: PathBuf,
    /// Collection identities registered before start.
    collections: Mutex<Vec<String>>,
    open: AtomicBool,
}

impl DiskStore {
    pub fn from_config(config: &StoreConfig) -> Result<Self, ResourceError> {
        let location = match config.raw.get("location") {
            None => PathBuf::from(".data").join(&config.name),
            Some(value) => {
                let text = value.as_str().ok_or_else(|| ResourceError::Instantiation {
                    store: config.name.clone(),
                    adapter: "disk".into(),
                    reason: "'location' must be a string".into(),
                })?;
                PathBuf::from(text)
            }
        };

        Ok(Self {
            store_name: config.name.clone(),
            location,
            collections: Mutex::new(Vec::new()),
            open: AtomicBool::new(false),
        })
    }

    fn collection_path(&self, identity: &str) -> PathBuf {
        self.location.join(format!("{identity}.json"))
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

#[async_trait]
impl StoreAdapter for DiskStore {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Disk
    }

    async fn start(&self) -> Result<(), ResourceError> {
        let failed = |e: std::io::Error| ResourceError::StartFailed {
            store: self.store_name.clone(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.location).await.map_err(failed)?;

        let identities = self.collections.lock().expect("collection list poisoned").clone();
        for identity in identities {
            let path = self.collection_path(&identity);
            if tokio::fs::try_exists(&path).await.map_err(failed)? {
                continue;
            }
            tokio::fs::write(&path, b"[]").await.map_err(failed)?;
        }

        self.open.store(true, Ordering::Release);
        tracing::debug!(store = %self.store_name, location = %self.location.display(), "disk store opened");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ResourceError> {
        // Writes are flushed as they happen; closing only drops the handle.
        self.open.store(false, Ordering::Release);
        tracing::debug!(store = %self.store_name, "disk store closed");
        Ok(())
    }

    fn add_model(
        &self,
        definition: &ModelDefinition,
        _context_user: &str,
    ) -> Result<ModelHandle, ResourceError> {
        let mut collections = self.collections.lock().expect("collection list poisoned");
        if !collections.contains(&definition.identity) {
            collections.push(definition.identity.clone());
        }

        Ok(ModelHandle {
            identity: definition.identity.clone(),
            global_id: definition.effective_global_id(),
            store: self.store_name.clone(),
            kind: AdapterKind::Disk,
        })
    }

    fn session_connector(&self) -> SessionConnector {
        SessionConnector::File(self.location.join("sessions.json"))
    }
}
