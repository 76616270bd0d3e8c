//! Server module: the development HTTP surface.
//!
//! # Responsibilities
//! - Bind the configured port and serve via axum
//! - Expose `GET /_routes` (current route table as JSON) outside
//!   production
//! - Keep serving across reloads: handlers read the route-table snapshot
//!   per request, so a reload swaps routes under a live listener
//!
//! # Design Decisions
//! - Non-reloadable: stopping and rebinding the listener mid-reload
//!   would drop connections for no benefit
//! - A port already in use is fatal at boot, with an explicit hint

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::module::LifecycleModule;
use crate::routing::RouteTable;

struct ServerHandle {
    stop_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

pub struct ServerModule {
    handle: Mutex<Option<ServerHandle>>,
    first_start: AtomicBool,
}

impl ServerModule {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
            first_start: AtomicBool::new(true),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().expect("server handle poisoned").is_some()
    }
}

impl Default for ServerModule {
    fn default() -> Self {
        Self::new()
    }
}

async fn routes_handler(State(routes): State<Arc<ArcSwap<RouteTable>>>) -> Json<RouteTable> {
    Json(RouteTable::clone(&routes.load()))
}

#[async_trait]
impl LifecycleModule for ServerModule {
    fn name(&self) -> &'static str {
        "server"
    }

    fn runlevel(&self) -> u8 {
        6
    }

    // the listener survives reloads; handlers observe fresh snapshots
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
        let port = ctx.config().settings().port;

        let router = if ctx.production {
            Router::new()
        } else {
            Router::new()
                .route("/_routes", get(routes_handler))
                .with_state(Arc::clone(&ctx.routes))
        };
        let router = router.layer(TraceLayer::new_for_http());

        let listener = match TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => listener,
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::error!(port, "port is already in use");
                tracing::error!("modify your config or kill the other process");
                return Err(LifecycleError::phase("server", "start", e));
            }
            Err(e) => return Err(LifecycleError::phase("server", "start", e)),
        };

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let mut shutdown_rx = ctx.shutdown.subscribe();
        let graceful = async move {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = stop_rx.changed() => {}
            }
        };

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .await
            {
                tracing::error!(error = %e, "server error");
            }
        });

        if self.first_start.swap(false, Ordering::SeqCst) {
            tracing::info!(
                port,
                boot_ms = ctx.booted_at.elapsed().as_millis() as u64,
                "server started"
            );
        } else {
            tracing::info!(port, "server started");
        }

        *self.handle.lock().expect("server handle poisoned") = Some(ServerHandle { stop_tx, task });
        Ok(())
    }

    async fn stop(&self, _ctx: &AppContext) -> LifecycleResult<()> {
        let handle = self.handle.lock().expect("server handle poisoned").take();
        let Some(handle) = handle else {
            tracing::warn!("server was not running, nothing to stop");
            return Ok(());
        };

        let _ = handle.stop_tx.send(true);
        let _ = handle.task.await;
        tracing::info!("server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx_on_port(port: u16, production: bool) -> AppContext {
        let config =
            Config::from_value(format!("port = {port}").parse().unwrap()).unwrap();
        AppContext::new(config, ".".into(), production)
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let ctx = ctx_on_port(28471, true);
        let server = ServerModule::new();

        server.start(&ctx).await.unwrap();
        assert!(server.is_running());

        server.stop(&ctx).await.unwrap();
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_stop_without_start_succeeds() {
        let ctx = ctx_on_port(28472, true);
        let server = ServerModule::new();
        assert!(server.stop(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_port_in_use_is_fatal() {
        let ctx = ctx_on_port(28473, true);
        let first = ServerModule::new();
        first.start(&ctx).await.unwrap();

        let second = ServerModule::new();
        let err = second.start(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("start"));

        first.stop(&ctx).await.unwrap();
    }
}
