//! Hot-reload and shutdown coordination.
//!
//! # Protocol
//! ```text
//! reload trigger
//!     → single-flight guard (concurrent triggers are dropped)
//!     → refresh config snapshot from disk
//!     → run loaders strictly in registration order
//!     → abort remaining loaders on the first failure (process lives on)
//!     → log elapsed time
//!
//! shutdown trigger
//!     → run reapers strictly in registration order
//!     → fire the shutdown broadcast
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::config::load_config;
use crate::context::AppContext;
use crate::error::ReloadError;
use crate::lifecycle::registry::ModuleRegistry;

/// Drives hot reloads and the shutdown path.
pub struct ReloadCoordinator {
    ctx: Arc<AppContext>,
    registry: Arc<ModuleRegistry>,
    /// Config file to re-read on each reload; `None` for embedded use
    /// where the snapshot is managed by the host.
    config_path: Option<PathBuf>,
    in_flight: Mutex<()>,
}

impl ReloadCoordinator {
    pub fn new(
        ctx: Arc<AppContext>,
        registry: Arc<ModuleRegistry>,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            ctx,
            registry,
            config_path,
            in_flight: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Run one hot-reload cycle.
    ///
    /// Errors never escape: a failing config refresh or loader aborts the
    /// cycle with an error log and the process keeps serving its previous
    /// state.
    pub async fn reload(&self) {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::warn!("reload already in flight, ignoring trigger");
            return;
        };

        let started = Instant::now();

        if let Err(e) = self.refresh_config() {
            tracing::error!(error = %e, "hot reload aborted");
            return;
        }

        for (name, loader) in self.ctx.hooks.loaders() {
            if let Err(source) = loader().await {
                let e = ReloadError::LoaderFailed {
                    loader: name,
                    source,
                };
                tracing::error!(error = %e, "hot reload aborted");
                return;
            }
        }

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "server hot reload completed"
        );
    }

    /// Re-read the configuration file and swap the shared snapshot.
    ///
    /// The next load/configure phases observe the fresh snapshot; on
    /// failure the current one stays in place.
    fn refresh_config(&self) -> Result<(), ReloadError> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        let config = load_config(path)?;
        self.ctx.config.store(Arc::new(config));
        tracing::debug!(path = %path.display(), "configuration snapshot refreshed");
        Ok(())
    }

    /// Run the reaper list, then fire the shutdown broadcast.
    ///
    /// Reaper failures are logged and the list keeps running; shutdown
    /// releases everything it can.
    pub async fn shutdown(&self) {
        let _guard = self.in_flight.lock().await;

        for (name, reaper) in self.ctx.hooks.reapers() {
            if let Err(e) = reaper().await {
                tracing::error!(reaper = %name, error = %e, "reaper failed");
            }
        }

        self.ctx.shutdown.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::hooks::hook;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    fn coordinator() -> (Arc<AppContext>, Arc<ReloadCoordinator>) {
        let ctx = Arc::new(AppContext::new(Default::default(), ".".into(), true));
        let registry = Arc::new(ModuleRegistry::new());
        let coordinator = Arc::new(ReloadCoordinator::new(ctx.clone(), registry, None));
        (ctx, coordinator)
    }

    #[tokio::test]
    async fn test_failing_loader_aborts_remaining() {
        let (ctx, coordinator) = coordinator();
        let journal = Arc::new(StdMutex::new(Vec::new()));

        let j = journal.clone();
        ctx.hooks.add_loader(
            "first",
            hook(move || {
                let j = j.clone();
                async move {
                    j.lock().unwrap().push("first");
                    Err("boom".into())
                }
            }),
        );
        let j = journal.clone();
        ctx.hooks.add_loader(
            "second",
            hook(move || {
                let j = j.clone();
                async move {
                    j.lock().unwrap().push("second");
                    Ok(())
                }
            }),
        );

        coordinator.reload().await;

        // second loader never ran, and the process is still here
        assert_eq!(*journal.lock().unwrap(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_concurrent_trigger_is_dropped() {
        let (ctx, coordinator) = coordinator();
        let runs = Arc::new(AtomicUsize::new(0));

        let r = runs.clone();
        ctx.hooks.add_loader(
            "slow",
            hook(move || {
                let r = r.clone();
                async move {
                    r.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(())
                }
            }),
        );

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.reload().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        coordinator.reload().await; // in flight: dropped
        first.await.unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_runs_reapers_in_order_despite_failures() {
        let (ctx, coordinator) = coordinator();
        let journal = Arc::new(StdMutex::new(Vec::new()));

        let j = journal.clone();
        ctx.hooks.add_reaper(
            "failing",
            hook(move || {
                let j = j.clone();
                async move {
                    j.lock().unwrap().push("failing");
                    Err("boom".into())
                }
            }),
        );
        let j = journal.clone();
        ctx.hooks.add_reaper(
            "second",
            hook(move || {
                let j = j.clone();
                async move {
                    j.lock().unwrap().push("second");
                    Ok(())
                }
            }),
        );

        coordinator.shutdown().await;

        assert_eq!(*journal.lock().unwrap(), vec!["failing", "second"]);
        assert!(ctx.shutdown.is_triggered());
    }
}
