//! Logging setup.
//!
//! The lifecycle core logs through `tracing`; this module owns
//! subscriber installation. Log formatting and transport beyond the
//! console/file layers are out of scope.

pub mod logging;
