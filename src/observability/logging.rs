//! Structured logging.
//!
//! # Responsibilities
//! - Install the global tracing subscriber once, before boot
//! - Level from `RUST_LOG`, falling back to `armature=info`
//! - Optional file layer when the `log` config key names a file
//!
//! # Design Decisions
//! - The subscriber cannot be re-installed, which is why the log module
//!   declares itself non-reloadable
//! - File logging failures fall back to console-only with a warning,
//!   never abort boot

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Install the global subscriber. Safe to call more than once; later
/// calls are no-ops (which tests rely on).
pub fn init(config: &Config, app_dir: &Path) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("armature=info"));

    let file_layer = config
        .settings()
        .log
        .as_deref()
        .and_then(|name| open_log_file(app_dir, name))
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
        });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init();
}

fn open_log_file(app_dir: &Path, name: &str) -> Option<std::fs::File> {
    let dir = app_dir.join("logs");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("unable to create log directory {}: {e}", dir.display());
        return None;
    }
    match OpenOptions::new().create(true).append(true).open(dir.join(name)) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("unable to open log file {name}: {e}");
            None
        }
    }
}
