use std::sync::Arc;

use inverter_monitor::state::StateStore;
use inverter_monitor::ws::manager::ConnectionManager;
use inverter_monitor::ws::transport::TungsteniteTransport;
use inverter_monitor::{config, display};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting inverter-monitor (stream={}, backoff={:?}..{:?})",
        config.page.endpoint(),
        config.backoff.min,
        config.backoff.max,
    );

    let store = Arc::new(StateStore::new());
    let display_handle = tokio::spawn(display::run(store.clone()));

    let mut manager = ConnectionManager::new(
        config.page.clone(),
        config.backoff,
        config.connect_timeout,
        store,
        TungsteniteTransport,
    );
    manager.start();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down");
        }
        _ = async {
            let mut sigterm = tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate()
            ).expect("Failed to register SIGTERM handler");
            sigterm.recv().await;
        } => {
            info!("Received SIGTERM, shutting down");
        }
    }

    drop(manager);
    display_handle.abort();
    info!("inverter-monitor stopped");
}
