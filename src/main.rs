//! schemagate control plane
//!
//! # Architecture Overview
//!
//! ```text
//!   storage (schemas/, resolver_maps/)
//!        │  notify
//!        ▼
//!   ┌──────────┐   snapshot   ┌─────────────┐   endpoints   ┌──────────────┐
//!   │ watcher  │─────────────▶│ event loop  │──────────────▶│ HTTP server  │
//!   └──────────┘   errors     │ reconcile   │   (arc-swap)  └──────────────┘
//!                             └──────┬──────┘
//!                                    │ reports, skeletons      route table
//!                                    ├──────────▶ storage      ───────────▶ proxy
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use schemagate::config::{load_config, validate_config, ConfigError, ControlPlaneConfig};
use schemagate::lifecycle::{wait_for_signal, ControlPlane, Shutdown};
use schemagate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "schemagate")]
#[command(about = "GraphQL gateway control plane", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `storage.root`.
    #[arg(long)]
    storage_root: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<ControlPlaneConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ControlPlaneConfig::default(),
    };
    if let Some(root) = &cli.storage_root {
        config.storage.root = root.clone();
    }
    if let Some(bind) = &cli.bind {
        config.server.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("schemagate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        storage_root = ?config.storage.root,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                metrics::init_metrics(addr);
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let control_plane = ControlPlane::setup(config)?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    control_plane.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
