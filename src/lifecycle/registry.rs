//! Runlevel-ordered module registry and sweep driver.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::context::AppContext;
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::module::{LifecycleModule, ModuleState, Phase};

struct ModuleEntry {
    module: Arc<dyn LifecycleModule>,
    state: ModuleState,
}

/// Owns every registered module and the process-wide module-state table.
///
/// Sweeps run strictly sequentially: ascending runlevel on the way up,
/// descending on the way down. The init sweep is resumable — it drives
/// each module from wherever it currently is toward `Started`, so a
/// reload after a partial failure picks up where the last one stopped.
pub struct ModuleRegistry {
    entries: Mutex<Vec<ModuleEntry>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Register a module at its declared runlevel.
    ///
    /// Insertion keeps the list sorted by runlevel, stable for ties. A
    /// second module with an already-registered name is ignored with a
    /// warning; there is exactly one live module per name.
    pub async fn register(&self, module: Arc<dyn LifecycleModule>) {
        let mut entries = self.entries.lock().await;

        if entries.iter().any(|e| e.module.name() == module.name()) {
            tracing::warn!(module = module.name(), "module already registered, ignoring");
            return;
        }

        let position = entries
            .iter()
            .position(|e| e.module.runlevel() > module.runlevel())
            .unwrap_or(entries.len());
        tracing::debug!(
            module = module.name(),
            runlevel = module.runlevel(),
            reloadable = module.reloadable(),
            "module registered"
        );
        entries.insert(
            position,
            ModuleEntry {
                module,
                state: ModuleState::Unloaded,
            },
        );
    }

    /// Current state of a module, if registered.
    pub async fn state_of(&self, name: &str) -> Option<ModuleState> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|e| e.module.name() == name)
            .map(|e| e.state)
    }

    /// Registered module names in runlevel order.
    pub async fn names(&self) -> Vec<&'static str> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|e| e.module.name())
            .collect()
    }

    /// Boot sweep: ascending runlevel, load → configure → start per
    /// module, awaiting each phase. The first failure aborts the sweep
    /// and propagates — the process must not serve traffic
    /// half-initialized.
    pub async fn init_all(&self, ctx: &AppContext) -> LifecycleResult<()> {
        let mut entries = self.entries.lock().await;
        for entry in entries.iter_mut() {
            Self::init_entry(entry, ctx).await?;
        }
        Ok(())
    }

    /// Shutdown sweep: descending runlevel, stop every active module.
    ///
    /// Stop failures are logged and the sweep continues — shutdown
    /// releases as much as it can.
    pub async fn stop_all(&self, ctx: &AppContext) {
        let mut entries = self.entries.lock().await;
        for entry in entries.iter_mut().rev() {
            if !entry.state.is_active() {
                tracing::debug!(module = entry.module.name(), "nothing to stop");
                continue;
            }
            if let Err(e) = Self::drive(entry, ctx, Phase::Stop).await {
                tracing::error!(module = entry.module.name(), error = %e, "stop failed");
            }
        }
    }

    /// Reload sweep: stop reloadable modules in descending order, then
    /// re-init them in ascending order. Non-reloadable modules are not
    /// touched — their state is left exactly as it was.
    ///
    /// Invoked from the reload coordinator, never recursively.
    pub async fn reload_all(&self, ctx: &AppContext) -> LifecycleResult<()> {
        let mut entries = self.entries.lock().await;

        for entry in entries.iter_mut().rev() {
            if !entry.module.reloadable() {
                tracing::debug!(module = entry.module.name(), "not reloadable, skipped");
                continue;
            }
            if entry.state.is_active() {
                Self::drive(entry, ctx, Phase::Stop).await?;
            }
        }

        for entry in entries.iter_mut() {
            if !entry.module.reloadable() {
                continue;
            }
            Self::init_entry(entry, ctx).await?;
        }

        Ok(())
    }

    /// Drive one module from its current state to `Started`.
    async fn init_entry(entry: &mut ModuleEntry, ctx: &AppContext) -> LifecycleResult<()> {
        // a stopped module discards its previous incarnation first
        if entry.state == ModuleState::Stopped {
            entry.state = ModuleState::Unloaded;
        }

        if entry.state == ModuleState::Unloaded {
            Self::drive(entry, ctx, Phase::Load).await?;
        }
        if entry.state == ModuleState::Loaded {
            Self::drive(entry, ctx, Phase::Configure).await?;
        }
        if entry.state == ModuleState::Configured {
            Self::drive(entry, ctx, Phase::Start).await?;
            tracing::info!(
                module = entry.module.name(),
                runlevel = entry.module.runlevel(),
                "module started"
            );
        }
        Ok(())
    }

    /// Apply one phase with transition checking.
    async fn drive(entry: &mut ModuleEntry, ctx: &AppContext, phase: Phase) -> LifecycleResult<()> {
        if !entry.state.permits(phase) {
            return Err(LifecycleError::InvalidTransition {
                module: entry.module.name().to_string(),
                from: entry.state,
                phase: phase.name(),
            });
        }

        let result = match phase {
            Phase::Load => entry.module.load(ctx).await,
            Phase::Configure => entry.module.configure(ctx).await,
            Phase::Start => entry.module.start(ctx).await,
            Phase::Stop => entry.module.stop(ctx).await,
        };

        match result {
            Ok(()) => {
                entry.state = entry.state.after(phase);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    module = entry.module.name(),
                    phase = phase.name(),
                    error = %e,
                    "lifecycle phase failed"
                );
                Err(e)
            }
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
