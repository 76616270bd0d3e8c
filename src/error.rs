//! Error taxonomy for the lifecycle core.
//!
//! Three families with different blast radii:
//! - configuration and resource errors abort boot (the process must not
//!   serve traffic half-initialized)
//! - reload errors are caught at the coordinator boundary; the process
//!   stays alive on its previous state
//! - stopping something that holds nothing is a logged warning, not an
//!   error

use thiserror::Error;

/// Errors caused by missing or invalid configuration. Always fatal at boot.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No `stores.<name>` entry exists for a requested store.
    #[error("store '{0}' is not configured, check your configuration file")]
    MissingStore(String),

    /// A model names no store and no `stores.default` entry exists.
    #[error("there is no default store and {0} is missing one")]
    NoDefaultStore(String),

    /// The configured adapter identifier is not a supported kind.
    #[error("adapter '{adapter}' for store '{store}' is not valid, check your configuration file")]
    InvalidAdapter { store: String, adapter: String },

    /// Two model definitions declared the same global identifier.
    #[error("global id '{0}' is declared by more than one model")]
    DuplicateGlobalId(String),

    /// A global identifier is already bound by another module.
    #[error("global '{name}' is already bound by module '{owner}'")]
    BindingCollision { name: String, owner: String },
}

/// Errors from adapter instantiation or store connections.
///
/// During boot these are escalated to fatal: a store that cannot be
/// built or started is a misconfiguration, not a runtime fault.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The adapter constructor failed.
    #[error("unable to instantiate adapter '{adapter}' for store '{store}': {reason}")]
    Instantiation {
        store: String,
        adapter: String,
        reason: String,
    },

    /// A store failed to open its backing resources.
    #[error("store '{store}' failed to start: {reason}")]
    StartFailed { store: String, reason: String },

    /// A store failed to release its backing resources.
    #[error("store '{store}' failed to stop: {reason}")]
    StopFailed { store: String, reason: String },
}

/// Errors surfaced while driving module lifecycle phases.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A phase was invoked out of order. This is a programming error and
    /// aborts the sweep.
    #[error("module '{module}' cannot move from {from:?} via '{phase}'")]
    InvalidTransition {
        module: String,
        from: crate::lifecycle::ModuleState,
        phase: &'static str,
    },

    /// A module phase failed; the boot or reload sweep is aborted.
    #[error("module '{module}' failed during '{phase}': {source}")]
    PhaseFailed {
        module: String,
        phase: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// A loader failed during hot reload. Logged, never propagated past the
/// reload coordinator.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("loader '{loader}' failed: {source}")]
    LoaderFailed {
        loader: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The configuration snapshot could not be refreshed from disk.
    #[error("configuration refresh failed: {0}")]
    ConfigRefresh(#[from] crate::config::loader::ConfigError),
}

/// Result alias for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl LifecycleError {
    /// Wrap an arbitrary module-phase failure.
    pub fn phase(
        module: impl Into<String>,
        phase: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::PhaseFailed {
            module: module.into(),
            phase,
            source: Box::new(source),
        }
    }
}

/// Print a fatal error as a blank-line-delimited block and exit non-zero.
///
/// Boot-time errors are terminal; this is the single funnel through which
/// they reach the console.
pub fn exit_fatal(err: &dyn std::error::Error) -> ! {
    eprintln!();
    tracing::error!("{err}");
    let mut source = err.source();
    while let Some(cause) = source {
        tracing::error!("{cause}");
        source = cause.source();
    }
    eprintln!();
    std::process::exit(1);
}
