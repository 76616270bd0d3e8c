//! armature: module-lifecycle orchestration core.
//!
//! Loads independent subsystems in runlevel order, walks each through
//! load → configure → start, wires per-module bindings into a shared
//! typed registry, and hot-reloads the lot without restarting the
//! process.

// Core subsystems
pub mod config;
pub mod context;
pub mod lifecycle;
pub mod stores;

// Shared scope
pub mod globals;
pub mod routing;

// Built-in modules
pub mod modules;

// Cross-cutting concerns
pub mod bootstrap;
pub mod error;
pub mod observability;

pub use bootstrap::Bootstrap;
pub use config::Config;
pub use context::AppContext;
pub use lifecycle::{LifecycleModule, ModuleRegistry, ModuleState, ReloadCoordinator, Shutdown};
