//! ledger-gate: session-aware edge gateway for the business management suite.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                    LEDGER GATE                      │
//!                    │                                                     │
//!    Browser Request │  ┌─────────┐    ┌─────────┐    ┌───────────────┐   │
//!    ────────────────┼─▶│  http   │───▶│  guard  │───▶│   upstream    │   │
//!                    │  │ server  │    │ session │    │  pool (round  │   │
//!                    │  └─────────┘    │ + roles │    │    robin)     │   │
//!                    │                 └────┬────┘    └───────┬───────┘   │
//!                    │                      │ redirect        │           │
//!    307 Redirect    │                      ▼                 ▼           │
//!    ◀───────────────┼── /login, /unauthorized, ...     page-rendering ───┼──▶ Replicas
//!                    │                                      replicas      │
//!                    │                                                    │
//!                    │  ┌──────────────────────────────────────────────┐  │
//!                    │  │            Cross-Cutting Concerns            │  │
//!                    │  │  ┌────────┐ ┌───────┐ ┌──────────┐ ┌──────┐  │  │
//!                    │  │  │ config │ │ store │ │observabi-│ │admin │  │  │
//!                    │  │  │+reload │ │client │ │  lity    │ │ API  │  │  │
//!                    │  │  └────────┘ └───────┘ └──────────┘ └──────┘  │  │
//!                    │  │  ┌──────────────────┐  ┌───────────────────┐ │  │
//!                    │  │  │    resilience    │  │     lifecycle     │ │  │
//!                    │  │  │  retry/backoff   │  │ signals/shutdown  │ │  │
//!                    │  │  └──────────────────┘  └───────────────────┘ │  │
//!                    │  └──────────────────────────────────────────────┘  │
//!                    └────────────────────────────────────────────────────┘
//! ```
//!
//! # Startup Sequence
//!
//! 1. Parse CLI arguments, load + validate the TOML config
//! 2. Initialize tracing and the Prometheus exporter
//! 3. Start the config file watcher (hot reload)
//! 4. Start the admin listener when enabled
//! 5. Install signal handlers, serve until shutdown

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ledger_gate::admin::setup_admin_router;
use ledger_gate::config::loader::load_config;
use ledger_gate::config::watcher::ConfigWatcher;
use ledger_gate::lifecycle::signals::shutdown_on_signal;
use ledger_gate::observability::{logging, metrics};
use ledger_gate::{GateConfig, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "ledger-gate")]
#[command(about = "Session-aware edge gateway", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "ledger-gate starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        replicas = config.upstream.replicas.len(),
        store = %config.store.base_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    // The watcher handle must stay alive for reload events to keep flowing.
    let (config_updates, _watcher) = if let Some(path) = &args.config {
        let (watcher, rx) = ConfigWatcher::new(path);
        let handle = watcher.run()?;
        (rx, Some(handle))
    } else {
        let (_tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (rx, None)
    };

    let server = HttpServer::new(config.clone())?;

    if config.admin.enabled {
        let admin_state = server.state();
        let admin_addr = config.admin.bind_address.clone();
        let mut admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let router = setup_admin_router(admin_state);
            match TcpListener::bind(&admin_addr).await {
                Ok(listener) => {
                    tracing::info!(address = %admin_addr, "Admin API listening");
                    let served = axum::serve(listener, router)
                        .with_graceful_shutdown(async move {
                            let _ = admin_shutdown.recv().await;
                        })
                        .await;
                    if let Err(err) = served {
                        tracing::error!(error = %err, "Admin server error");
                    }
                }
                Err(err) => {
                    tracing::error!(
                        address = %admin_addr,
                        error = %err,
                        "Failed to bind admin listener"
                    );
                }
            }
        });
    }

    tokio::spawn(shutdown_on_signal(shutdown));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
