//! Shared application context.
//!
//! Every lifecycle method receives `&AppContext`: an explicit,
//! dependency-injected bundle of the process-wide singletons. Modules
//! reach collaborators through it instead of ambient globals, and each
//! singleton is mutated only by its owning manager.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;

use crate::config::Config;
use crate::globals::GlobalBindingManager;
use crate::lifecycle::hooks::LoaderReaperRegistry;
use crate::lifecycle::shutdown::Shutdown;
use crate::routing::RouteTable;
use crate::stores::{AdapterRegistry, StoreManager};

pub struct AppContext {
    /// Live configuration snapshot, swapped atomically on reload.
    pub config: ArcSwap<Config>,

    /// Store resolution and cache.
    pub stores: StoreManager,

    /// Shared binding registry.
    pub globals: GlobalBindingManager,

    /// Loader/reaper callback lists.
    pub hooks: LoaderReaperRegistry,

    /// Currently registered routes, swapped atomically on reload.
    /// Arc'd so the server task can hold it past the lifecycle call.
    pub routes: Arc<ArcSwap<RouteTable>>,

    /// Graceful-shutdown broadcast.
    pub shutdown: Shutdown,

    /// Root of the hosted application (`app/models`, `.eslintrc`, …).
    pub app_dir: PathBuf,

    /// Production mode: no watcher, no stdin control, no diagnostics.
    pub production: bool,

    /// Process start, for boot-timing logs.
    pub booted_at: Instant,
}

impl AppContext {
    pub fn new(config: Config, app_dir: PathBuf, production: bool) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            stores: StoreManager::new(AdapterRegistry::builtin()),
            globals: GlobalBindingManager::new(),
            hooks: LoaderReaperRegistry::new(),
            routes: Arc::new(ArcSwap::from_pointee(RouteTable::default())),
            shutdown: Shutdown::new(),
            app_dir,
            production,
            booted_at: Instant::now(),
        }
    }

    /// The current configuration snapshot.
    pub fn config(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// The current route table snapshot.
    pub fn route_table(&self) -> Arc<RouteTable> {
        self.routes.load_full()
    }
}
