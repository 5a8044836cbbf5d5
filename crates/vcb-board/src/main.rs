//! # vcb-board
//!
//! Visual control board server binary: loads settings and the initial board
//! configuration, wires the synchronization core, and starts the
//! HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use vcb_actions::HandlerCatalog;
use vcb_server::{BoardConfigLoader, BoardServer, ServerConfig};
use vcb_settings::BoardSettings;
use vcb_sync::{BroadcastManager, SyncFacade, TransitionManager};

/// How long in-flight sessions get to finish after Ctrl-C.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Visual control board server.
#[derive(Parser, Debug)]
#[command(name = "vcb-board", about = "Visual control board server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding `ui_config.json` and `actions_config.json`.
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Settings file (defaults to `~/.vcb/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags win over every settings layer.
    fn apply_to(&self, settings: &mut BoardSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref dir) = self.config_dir {
            settings.board.config_dir = dir.to_string_lossy().into_owned();
        }
    }
}

/// Load settings from `path` (or the default location) and apply CLI flags.
fn resolve_settings(cli: &Cli) -> Result<BoardSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(vcb_settings::settings_path);
    let mut settings = vcb_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    cli.apply_to(&mut settings);
    Ok(settings)
}

/// Load the initial board, resolve its actions, and assemble the server.
///
/// Any failure here is fatal: the board never starts with a configuration
/// it cannot execute.
fn build_server(settings: &BoardSettings) -> Result<BoardServer> {
    let loader = BoardConfigLoader::from_settings(&settings.board);
    let snapshot = loader.load().with_context(|| {
        format!(
            "Failed to load board configuration from {}",
            settings.board.resolved_config_dir().display()
        )
    })?;

    let catalog = HandlerCatalog::with_builtins();
    for module in catalog.modules() {
        tracing::debug!(%module, functions = ?catalog.functions(&module), "handler catalog");
    }
    let transitions =
        TransitionManager::new(Arc::new(catalog), snapshot, settings.actions.timeout())
            .context("Failed to resolve actions of the initial configuration")?;

    let config = ServerConfig::from(&settings.server);
    let connections = BroadcastManager::new(config.broadcast_config());
    let facade = SyncFacade::new(transitions, connections);
    Ok(BoardServer::new(config, facade))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;

    let level = settings.logging.level.as_filter_str();
    if settings.logging.json {
        vcb_core::logging::init_json_subscriber(level);
    } else {
        vcb_core::logging::init_subscriber(level);
    }

    let metrics = vcb_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;
    let server = build_server(&settings)?.with_metrics(metrics);

    let (addr, handle) = server
        .listen()
        .await
        .with_context(|| format!("Failed to bind {}", server.config().bind_addr()))?;
    tracing::info!(%addr, version = vcb_core::constants::VERSION, "visual control board ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    if !server
        .shutdown()
        .graceful_shutdown(handle, Some(SHUTDOWN_TIMEOUT))
        .await
    {
        tracing::warn!("exiting with sessions still open");
    }
    Ok(())
}
