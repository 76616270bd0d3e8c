//! Router module: compiles configured route specs into the shared table.
//!
//! Dispatch belongs to the excluded routing collaborator; this module
//! only owns the table's lifecycle — built on configure, swapped in
//! atomically, detached on stop, rebuilt from the fresh config snapshot
//! on every reload.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::context::AppContext;
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::module::LifecycleModule;
use crate::routing::RouteTable;

#[derive(Default)]
pub struct RouterModule {
    /// Raw `(spec, target)` pairs picked up by the last load.
    specs: Mutex<Vec<(String, String)>>,
}

impl RouterModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LifecycleModule for RouterModule {
    fn name(&self) -> &'static str {
        "router"
    }

    fn runlevel(&self) -> u8 {
        5
    }

    async fn load(&self, ctx: &AppContext) -> LifecycleResult<()> {
        let config = ctx.config();
        let specs: Vec<(String, String)> = config
            .settings()
            .routes
            .iter()
            .map(|(spec, target)| (spec.clone(), target.clone()))
            .collect();

        tracing::debug!(count = specs.len(), "route specs loaded");
        *self.specs.lock().expect("spec list poisoned") = specs;
        Ok(())
    }

    async fn configure(&self, ctx: &AppContext) -> LifecycleResult<()> {
        let specs = self.specs.lock().expect("spec list poisoned").clone();
        let table = RouteTable::compile(
            specs
                .iter()
                .map(|(spec, target)| (spec.as_str(), target.as_str())),
        )
        .map_err(|e| LifecycleError::phase("router", "configure", e))?;

        ctx.routes.store(Arc::new(table));
        Ok(())
    }

    async fn start(&self, ctx: &AppContext) -> LifecycleResult<()> {
        tracing::info!(routes = ctx.route_table().len(), "routes registered");
        Ok(())
    }

    async fn stop(&self, ctx: &AppContext) -> LifecycleResult<()> {
        if ctx.route_table().is_empty() {
            tracing::warn!("no routes needed to be detached");
            return Ok(());
        }
        ctx.routes.store(Arc::new(RouteTable::default()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx_with_routes() -> AppContext {
        let config = Config::from_value(
            r#"
            [routes]
            "get /" = "home#index"
            "post /users" = "users#create"
            "#
            .parse()
            .unwrap(),
        )
        .unwrap();
        AppContext::new(config, ".".into(), true)
    }

    #[tokio::test]
    async fn test_configure_swaps_table_in() {
        let ctx = ctx_with_routes();
        let router = RouterModule::new();

        router.load(&ctx).await.unwrap();
        router.configure(&ctx).await.unwrap();

        assert_eq!(ctx.route_table().len(), 2);
    }

    #[tokio::test]
    async fn test_stop_detaches_table() {
        let ctx = ctx_with_routes();
        let router = RouterModule::new();

        router.load(&ctx).await.unwrap();
        router.configure(&ctx).await.unwrap();
        router.stop(&ctx).await.unwrap();

        assert!(ctx.route_table().is_empty());
    }

    #[tokio::test]
    async fn test_stop_with_nothing_attached_succeeds() {
        let ctx = AppContext::new(Config::default(), ".".into(), true);
        let router = RouterModule::new();
        assert!(router.stop(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_bad_spec_fails_configure() {
        let config = Config::from_value("[routes]\n\"teleport /\" = \"home#index\"".parse().unwrap())
            .unwrap();
        let ctx = AppContext::new(config, ".".into(), true);
        let router = RouterModule::new();

        router.load(&ctx).await.unwrap();
        assert!(router.configure(&ctx).await.is_err());
    }
}
