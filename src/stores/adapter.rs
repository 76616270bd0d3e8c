//! Adapter capability interface and kind registry.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::StoreConfig;
use crate::error::{ConfigurationError, ResourceError};

/// Supported adapter kinds.
///
/// The whitelist: a configured adapter id must parse into one of these
/// and have a constructor registered, otherwise boot fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdapterKind {
    /// JSON files under a data directory.
    Disk,
    /// In-process maps, nothing persisted.
    Memory,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Disk => "disk",
            AdapterKind::Memory => "memory",
        }
    }
}

impl FromStr for AdapterKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disk" => Ok(AdapterKind::Disk),
            // "mem" kept as a legacy alias
            "memory" | "mem" => Ok(AdapterKind::Memory),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute of a model definition.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AttributeSpec {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub required: bool,
}

/// A model definition discovered under `app/models`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModelDefinition {
    /// Collection identity, lowercase by convention.
    pub identity: String,

    /// Identifier the model is exposed under in shared scope. Defaults to
    /// the capitalized identity.
    #[serde(default)]
    pub global_id: Option<String>,

    /// Named store backing this model; absent means `stores.default`.
    #[serde(default)]
    pub store: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeSpec>,
}

impl ModelDefinition {
    /// The shared-scope identifier, deriving one from the identity when
    /// the definition does not declare it.
    pub fn effective_global_id(&self) -> String {
        match &self.global_id {
            Some(id) => id.clone(),
            None => {
                let mut chars = self.identity.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Handle returned by `add_model`, exposed under the model's global id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    pub identity: String,
    pub global_id: String,
    pub store: String,
    pub kind: AdapterKind,
}

/// Connector a session layer can hang off a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionConnector {
    /// Sessions held in process memory; lost on restart.
    Memory,
    /// Sessions persisted to a file.
    File(PathBuf),
}

/// Capability interface every store adapter implements.
#[async_trait]
pub trait StoreAdapter: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> AdapterKind;

    /// Open backing resources. Called once per instance, strictly after
    /// every model has been registered.
    async fn start(&self) -> Result<(), ResourceError>;

    /// Release backing resources.
    async fn stop(&self) -> Result<(), ResourceError>;

    /// Register a model with this store and hand back its shared handle.
    fn add_model(
        &self,
        definition: &ModelDefinition,
        context_user: &str,
    ) -> Result<ModelHandle, ResourceError>;

    fn session_connector(&self) -> SessionConnector;
}

type AdapterCtor = fn(&StoreConfig) -> Result<Arc<dyn StoreAdapter>, ResourceError>;

/// Fixed mapping from adapter kind to constructor.
pub struct AdapterRegistry {
    ctors: BTreeMap<AdapterKind, AdapterCtor>,
}

impl AdapterRegistry {
    /// Registry with the built-in kinds installed.
    pub fn builtin() -> Self {
        let mut registry = Self {
            ctors: BTreeMap::new(),
        };
        registry.register(AdapterKind::Disk, crate::stores::disk::make_store);
        registry.register(AdapterKind::Memory, crate::stores::memory::make_store);
        registry
    }

    pub fn register(&mut self, kind: AdapterKind, ctor: AdapterCtor) {
        self.ctors.insert(kind, ctor);
    }

    /// Validate the configured adapter id and construct the adapter.
    ///
    /// Unknown ids are a configuration error; a failing constructor is a
    /// resource error. Both abort boot.
    pub fn resolve(
        &self,
        store: &StoreConfig,
    ) -> Result<Arc<dyn StoreAdapter>, crate::error::LifecycleError> {
        let invalid = || ConfigurationError::InvalidAdapter {
            store: store.name.clone(),
            adapter: store.adapter.clone(),
        };

        let kind = AdapterKind::from_str(&store.adapter).map_err(|()| invalid())?;
        let ctor = self.ctors.get(&kind).ok_or_else(invalid)?;

        Ok(ctor(store)?)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
