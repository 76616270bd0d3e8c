//! Process bootstrap: context, modules, hooks, coordinator.
//!
//! Shared by the binary and the integration tests so both drive the
//! exact same wiring.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::context::AppContext;
use crate::lifecycle::hooks::hook;
use crate::lifecycle::module::LifecycleModule;
use crate::lifecycle::registry::ModuleRegistry;
use crate::lifecycle::reload::ReloadCoordinator;
use crate::modules::{LogModule, ModelModule, RouterModule, ServerModule};

/// Handles to a bootstrapped but not yet initialized process.
pub struct Bootstrap {
    pub ctx: Arc<AppContext>,
    pub registry: Arc<ModuleRegistry>,
    pub model: Arc<ModelModule>,
    pub coordinator: Arc<ReloadCoordinator>,
}

/// Build the context, register the built-in modules at their runlevels,
/// and wire the module-sweep loader and reaper.
pub async fn bootstrap(
    config: Config,
    app_dir: PathBuf,
    production: bool,
    config_path: Option<PathBuf>,
) -> Bootstrap {
    let ctx = Arc::new(AppContext::new(config, app_dir, production));
    let registry = Arc::new(ModuleRegistry::new());

    registry.register(Arc::new(LogModule::new())).await;
    let model = Arc::new(ModelModule::new());
    let model_dyn: Arc<dyn LifecycleModule> = Arc::clone(&model) as Arc<dyn LifecycleModule>;
    registry.register(model_dyn).await;
    registry.register(Arc::new(RouterModule::new())).await;
    registry.register(Arc::new(ServerModule::new())).await;

    // every reload re-runs the module sweep
    let loader_registry = Arc::clone(&registry);
    let loader_ctx = Arc::clone(&ctx);
    ctx.hooks.add_loader(
        "modules",
        hook(move || {
            let registry = Arc::clone(&loader_registry);
            let ctx = Arc::clone(&loader_ctx);
            async move {
                registry.reload_all(&ctx).await?;
                Ok(())
            }
        }),
    );

    // shutdown stops every module, releasing stores and listeners
    let reaper_registry = Arc::clone(&registry);
    let reaper_ctx = Arc::clone(&ctx);
    ctx.hooks.add_reaper(
        "modules",
        hook(move || {
            let registry = Arc::clone(&reaper_registry);
            let ctx = Arc::clone(&reaper_ctx);
            async move {
                registry.stop_all(&ctx).await;
                Ok(())
            }
        }),
    );

    let coordinator = Arc::new(ReloadCoordinator::new(
        Arc::clone(&ctx),
        Arc::clone(&registry),
        config_path,
    ));

    Bootstrap {
        ctx,
        registry,
        model,
        coordinator,
    }
}
