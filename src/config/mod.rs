//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//!     → shared via ArcSwap to all modules
//!
//! On reload:
//!     reload coordinator re-reads the file
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<Config>
//!     → modules observe the new snapshot on their next phase
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a reload
//! - Typed `Settings` for the global keys, raw dotted-path access for
//!   per-store tables (`stores.<name>.adapter` and friends)
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::load_config;
pub use schema::{Config, Settings, StoreConfig};
