//! Gateway route refresher.
//!
//! Watches a property file for changes under a key prefix and keeps a
//! gateway route table in sync with it.
//!
//! # Architecture Overview
//!
//! ```text
//!   property file ──▶ source watcher ──▶ ConfigChangeEvent
//!                      (flatten, diff)          │
//!                             │                 ▼
//!                    latest snapshot      ┌─────────────┐
//!                             │           │ Reconciler  │
//!                             │           │  1 pre-clear│──▶ Gateway.set_list(name, [])
//!                             └──────────▶│  2 rebind   │──▶ PropertiesBinder
//!                                         │  3 refresh  │──▶ Gateway.refresh_routes
//!                                         └─────────────┘          │
//!                                                                  ▼
//!                                                        active RouteTable (swap)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use clap::Parser;

use gateway_refresher::config::{load_config, RefresherConfig};
use gateway_refresher::observability::{logging, metrics};
use gateway_refresher::reconcile::{Reconciler, RouteTableConsumer};
use gateway_refresher::routing::{Gateway, GatewayProperties, PropertiesBinder, RouteTable};
use gateway_refresher::source::{load_snapshot, PropertySnapshot, SharedSnapshot, SourceWatcher};

#[derive(Parser)]
#[command(name = "gateway-refresher")]
#[command(about = "Keeps a gateway route table in sync with a watched property file", long_about = None)]
struct Cli {
    /// Refresher configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the watched property file.
    #[arg(short, long)]
    source: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RefresherConfig::default(),
    };
    if let Some(source) = cli.source {
        config.source.path = source.display().to_string();
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("gateway-refresher v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        source = %config.source.path,
        key_prefix = %config.source.key_prefix,
        lists = config.lists.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let source_path = PathBuf::from(&config.source.path);
    let initial = match load_snapshot(&source_path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(path = ?source_path, error = %e, "Initial source load failed, starting empty");
            PropertySnapshot::new()
        }
    };

    // Initial bind and route table before the first batch arrives.
    let properties = Arc::new(GatewayProperties::new());
    properties.bind(&initial, &config.source.key_prefix);
    let gateway = Arc::new(Gateway::new(properties.clone(), Arc::new(RouteTable::new())));
    gateway.refresh_routes()?;

    let initial = Arc::new(initial);
    let current: SharedSnapshot = Arc::new(ArcSwap::new(initial.clone()));
    let binder = Arc::new(PropertiesBinder::new(
        current.clone(),
        properties,
        config.source.key_prefix.clone(),
    ));
    let reconciler = Reconciler::new(config.list_bindings()?, binder, gateway.clone());

    let (watcher, mut updates) =
        SourceWatcher::new(&source_path, config.source.key_prefix.clone(), initial);
    let _watcher = watcher.run(Duration::from_secs(config.source.poll_interval_secs))?;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                update.publish(&current);
                // Failures are already logged and counted; the previous route
                // table stays active until the next batch.
                if let Ok(outcome) = reconciler.on_configuration_changed(&update.batch) {
                    tracing::debug!(
                        cleared = ?outcome.cleared_lists,
                        routes = gateway.table().routes().len(),
                        "Batch reconciled"
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
