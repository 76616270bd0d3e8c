//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Boot (registry.rs):
//!     register modules → init_all: ascending runlevel,
//!     load → configure → start per module, fail fast
//!
//! Reload (reload.rs):
//!     trigger (file change, stdin code, programmatic)
//!     → single-flight guard → refresh config snapshot
//!     → run loaders in registration order → log elapsed
//!
//! Shutdown (reload.rs + shutdown.rs):
//!     trigger → run reapers in registration order
//!     → broadcast shutdown → exit 0
//! ```
//!
//! # Design Decisions
//! - Ordered startup: lower runlevel boots first, stops last
//! - Modules initialize strictly sequentially, never concurrently
//! - Boot failures are fatal; reload failures are logged and contained
//! - Non-reloadable modules are untouched by the reload sweep

pub mod hooks;
pub mod module;
pub mod registry;
pub mod reload;
pub mod shutdown;
pub mod signals;

pub use hooks::LoaderReaperRegistry;
pub use module::{LifecycleModule, ModuleState};
pub use registry::ModuleRegistry;
pub use reload::ReloadCoordinator;
pub use shutdown::Shutdown;
pub use signals::ControlEvent;
