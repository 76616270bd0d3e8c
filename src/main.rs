//! armature binary: boot the framework core and park on the control
//! channel.

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;

use armature::bootstrap::bootstrap;
use armature::config::load_config;
use armature::error::exit_fatal;
use armature::lifecycle::signals::{self, ControlEvent};
use armature::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "armature", version, about = "module-lifecycle orchestration core")]
struct Args {
    /// Configuration file.
    #[arg(long, default_value = "config/settings.toml")]
    config: PathBuf,

    /// Root of the hosted application.
    #[arg(long, default_value = ".")]
    app_dir: PathBuf,

    /// Production mode: no watcher, no stdin control, no diagnostics.
    #[arg(long)]
    production: bool,

    /// Keep the dev control channel but skip the file watcher.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            logging::init(&Default::default(), &args.app_dir);
            exit_fatal(&e);
        }
    };
    logging::init(&config, &args.app_dir);

    tracing::info!(config = %args.config.display(), "armature starting");

    let boot = bootstrap(
        config,
        args.app_dir.clone(),
        args.production,
        Some(args.config.clone()),
    )
    .await;

    if let Err(e) = boot.registry.init_all(&boot.ctx).await {
        exit_fatal(&e);
    }

    if args.production {
        let _ = tokio::signal::ctrl_c().await;
        boot.coordinator.shutdown().await;
        tracing::warn!("exiting application...");
        return;
    }

    let (tx, mut rx) = mpsc::unbounded_channel();

    // the watcher must outlive the loop; dropping it stops the watch
    let _watcher = if args.no_watch {
        None
    } else {
        match signals::watch_app_dir(&args.app_dir, tx.clone()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::error!(error = %e, "file watcher unavailable, reload via ctrl-r only");
                None
            }
        }
    };
    signals::spawn_stdin_control(tx.clone());
    signals::spawn_ctrl_c(tx);

    while let Some(event) = rx.recv().await {
        match event {
            ControlEvent::Reload => boot.coordinator.reload().await,
            ControlEvent::Shutdown => {
                boot.coordinator.shutdown().await;
                eprintln!();
                tracing::warn!("exiting application...");
                eprintln!();
                std::process::exit(0);
            }
        }
    }
}
