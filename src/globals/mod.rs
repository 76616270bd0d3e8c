//! Shared binding registry.
//!
//! # Responsibilities
//! - Record every identifier a module exposes into shared scope
//! - Enumerate and remove a module's bindings en masse on teardown
//!
//! # Design Decisions
//! - An explicit typed registry (`name → handle`) instead of ambient
//!   global mutation; callers resolve by name
//! - A name belongs to the module that bound it; foreign rebinds are a
//!   namespace collision
//! - The recorded set always equals the installed set, so `unbind_all`
//!   cannot leave orphans behind

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::ConfigurationError;

/// Value installed under a shared identifier.
pub type BindingValue = Arc<dyn Any + Send + Sync>;

struct GlobalBinding {
    owner: String,
    value: BindingValue,
}

/// Tracks identifiers modules inject into shared scope.
#[derive(Default)]
pub struct GlobalBindingManager {
    bindings: DashMap<String, GlobalBinding>,
}

impl GlobalBindingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `value` under `name`, owned by `owner`.
    ///
    /// Re-binding by the same owner replaces the handle (the reload path);
    /// a name held by a different owner is a collision.
    pub fn bind(
        &self,
        name: impl Into<String>,
        owner: impl Into<String>,
        value: BindingValue,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        let owner = owner.into();

        if let Some(existing) = self.bindings.get(&name) {
            if existing.owner != owner {
                return Err(ConfigurationError::BindingCollision {
                    name,
                    owner: existing.owner.clone(),
                });
            }
        }

        self.bindings.insert(name, GlobalBinding { owner, value });
        Ok(())
    }

    /// Resolve a bound handle by name.
    pub fn resolve(&self, name: &str) -> Option<BindingValue> {
        self.bindings.get(name).map(|b| Arc::clone(&b.value))
    }

    /// Resolve and downcast a bound handle.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.resolve(name).and_then(|v| v.downcast::<T>().ok())
    }

    /// Names currently bound by `owner`, sorted for stable iteration.
    pub fn names_for(&self, owner: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .bindings
            .iter()
            .filter(|entry| entry.value().owner == owner)
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Remove every binding owned by `owner`. Afterwards none of them
    /// resolve.
    pub fn unbind_all(&self, owner: &str) -> usize {
        let names = self.names_for(owner);
        for name in &names {
            self.bindings.remove(name);
        }
        names.len()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
