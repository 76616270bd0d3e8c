//! Control-event sources for development mode.
//!
//! # Responsibilities
//! - Translate stdin control bytes, SIGINT, and filesystem changes into
//!   internal [`ControlEvent`]s
//! - One channel, one consumer: the bootstrap control loop
//!
//! # Design Decisions
//! - Events are fire-and-forget sends; the reload coordinator's
//!   single-flight guard absorbs bursts
//! - The watcher ignores dot-directories, logs and data directories, so
//!   a reload cannot re-trigger itself by writing store files

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

/// Internal control events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Reload,
    Shutdown,
}

/// Ctrl-C as delivered through a raw stdin.
pub const SHUTDOWN_BYTE: u8 = 0x03;
/// Ctrl-R as delivered through a raw stdin.
pub const RELOAD_BYTE: u8 = 0x12;

/// Read single-byte control codes from stdin.
pub fn spawn_stdin_control(tx: mpsc::UnboundedSender<ControlEvent>) {
    tokio::spawn(async move {
        let mut stdin = tokio::io::stdin();
        let mut buf = [0u8; 1];
        loop {
            match stdin.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => match buf[0] {
                    SHUTDOWN_BYTE => {
                        if tx.send(ControlEvent::Shutdown).is_err() {
                            break;
                        }
                    }
                    RELOAD_BYTE => {
                        tracing::warn!("user-requested server reload...");
                        if tx.send(ControlEvent::Reload).is_err() {
                            break;
                        }
                    }
                    _ => {}
                },
            }
        }
    });
}

/// Translate SIGINT into a shutdown event.
pub fn spawn_ctrl_c(tx: mpsc::UnboundedSender<ControlEvent>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(ControlEvent::Shutdown);
        }
    });
}

fn ignored(path: &Path) -> bool {
    path.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        name.starts_with('.') && name.len() > 1 || name == "logs" || name == "target"
    })
}

/// Watch the app directory and emit a reload event on every relevant
/// change. The returned watcher must stay alive for as long as watching
/// should continue.
pub fn watch_app_dir(
    app_dir: &Path,
    tx: mpsc::UnboundedSender<ControlEvent>,
) -> Result<RecommendedWatcher, notify::Error> {
    let root: PathBuf = app_dir.to_path_buf();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !event.kind.is_modify() && !event.kind.is_create() {
                    return;
                }
                let Some(path) = event.paths.iter().find(|p| !ignored(p)) else {
                    return;
                };
                tracing::warn!(path = %path.display(), "changes detected");
                let _ = tx.send(ControlEvent::Reload);
            }
            Err(e) => tracing::error!(error = %e, "watch error"),
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    tracing::info!("watching filesystem for changes...");
    Ok(watcher)
}
