//! Logging module.
//!
//! Runlevel 0 so every later module boots with logging in place. The
//! actual subscriber is installed by the bootstrap before the sweep runs
//! (boot errors must be loggable); this module carries the lifecycle
//! bookkeeping and announces the file transport.

use async_trait::async_trait;

use crate::context::AppContext;
use crate::error::LifecycleResult;
use crate::lifecycle::module::LifecycleModule;

#[derive(Default)]
pub struct LogModule;

impl LogModule {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LifecycleModule for LogModule {
    fn name(&self) -> &'static str {
        "log"
    }

    fn runlevel(&self) -> u8 {
        0
    }

    // the tracing subscriber cannot be torn down and re-installed
    fn reloadable(&self) -> bool {
        false
    }

    async fn load(&self, _ctx: &AppContext) -> LifecycleResult<()> {
        Ok(())
    }

    async fn configure(&self, _ctx: &AppContext) -> LifecycleResult<()> {
        Ok(())
    }

    async fn start(&self, ctx: &AppContext) -> LifecycleResult<()> {
        match ctx.config().settings().log.as_deref() {
            Some(file) => tracing::info!(file, "logger initialized, also logging to file"),
            None => tracing::warn!("no file set in configuration file: logging to console only"),
        }
        Ok(())
    }

    async fn stop(&self, _ctx: &AppContext) -> LifecycleResult<()> {
        // nothing held; the subscriber outlives the sweep
        Ok(())
    }
}
