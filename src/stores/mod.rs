//! Store resolution and caching.
//!
//! # Data Flow
//! ```text
//! configure phase asks for store "name"
//!     → manager.rs checks the cache (hit: same instance back)
//!     → config `stores.<name>` read, adapter id validated
//!     → adapter.rs registry resolves the kind to a constructor
//!     → StoreInstance built, cached, returned
//!
//! start phase:
//!     manager.start_all() → each cached store, strictly in order
//! stop phase:
//!     manager.stop_all() → reverse resources, then cache cleared so a
//!     reload rebuilds fresh instances
//! ```
//!
//! # Design Decisions
//! - Adapter identifiers map to statically linked implementations through
//!   a fixed registry; no runtime code loading
//! - One live instance per store name, ever
//! - Sequential store startup keeps log order deterministic and surfaces
//!   the first failing store unambiguously

pub mod adapter;
pub mod disk;
pub mod manager;
pub mod memory;

pub use adapter::{
    AdapterKind, AdapterRegistry, ModelDefinition, ModelHandle, SessionConnector, StoreAdapter,
};
pub use manager::{StoreInstance, StoreManager};
