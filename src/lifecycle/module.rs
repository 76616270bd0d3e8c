//! Per-module lifecycle state machine.
//!
//! # States
//! ```text
//! Unloaded → Loaded → Configured → Started
//!                          │           │
//!                          └───────────┴──→ Stopped ──(discard)──→ Unloaded
//! ```
//!
//! A reload is `Started → Stopped → Unloaded → Loaded → Configured →
//! Started`. Driving a phase from any other state is a programming error
//! and aborts the sweep.

use async_trait::async_trait;

use crate::context::AppContext;
use crate::error::LifecycleResult;

/// Lifecycle position of a registered module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Unloaded,
    Loaded,
    Configured,
    Started,
    Stopped,
}

/// The four driveable lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Load,
    Configure,
    Start,
    Stop,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Configure => "configure",
            Phase::Start => "start",
            Phase::Stop => "stop",
        }
    }
}

impl ModuleState {
    /// Whether `phase` may be driven from this state.
    pub fn permits(&self, phase: Phase) -> bool {
        matches!(
            (self, phase),
            (ModuleState::Unloaded, Phase::Load)
                | (ModuleState::Loaded, Phase::Configure)
                | (ModuleState::Configured, Phase::Start)
                | (ModuleState::Started, Phase::Stop)
                | (ModuleState::Configured, Phase::Stop)
        )
    }

    /// State after `phase` completes.
    pub fn after(&self, phase: Phase) -> ModuleState {
        match phase {
            Phase::Load => ModuleState::Loaded,
            Phase::Configure => ModuleState::Configured,
            Phase::Start => ModuleState::Started,
            Phase::Stop => ModuleState::Stopped,
        }
    }

    /// Whether the module currently holds startable/stoppable resources.
    pub fn is_active(&self) -> bool {
        matches!(self, ModuleState::Configured | ModuleState::Started)
    }
}

/// One subsystem under lifecycle management.
///
/// Implementations own their subsystem's artifacts (model definitions,
/// route specs, listener handles) behind interior mutability; the
/// registry owns the state table and drives phases strictly in order.
#[async_trait]
pub trait LifecycleModule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Boot/shutdown priority: lower boots first, stops last.
    fn runlevel(&self) -> u8;

    /// Non-reloadable modules are skipped entirely by the reload sweep.
    fn reloadable(&self) -> bool {
        true
    }

    /// Discover subsystem artifacts (definition files, route specs).
    async fn load(&self, ctx: &AppContext) -> LifecycleResult<()>;

    /// Validate artifacts and wire them into the shared context.
    async fn configure(&self, ctx: &AppContext) -> LifecycleResult<()>;

    /// Activate resources (open stores, bind listeners).
    async fn start(&self, ctx: &AppContext) -> LifecycleResult<()>;

    /// Release resources. Must be idempotent: stopping with nothing to
    /// stop warns and succeeds.
    async fn stop(&self, ctx: &AppContext) -> LifecycleResult<()>;
}
