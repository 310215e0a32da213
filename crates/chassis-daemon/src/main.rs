//! chassisd
//!
//! Long-running daemon that keeps every configured enclosure's bearer
//! token fresh and serves authenticated proxy calls from its session
//! store.

use std::path::PathBuf;
use std::sync::Arc;

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::sync::broadcast;
use tracing::{error, info};

use chassis_client::{EnclosureApi, EnclosureClient};
use chassis_daemon::config::DaemonConfig;
use chassis_daemon::error::{DaemonError, Result};
use chassis_daemon::scheduler::run_refresh_scheduler;
use chassis_daemon::sessions::SessionStore;

/// Initializes structured logging with tracing.
///
/// Supports two output formats via `CHASSISD_LOG_FORMAT` environment variable:
/// - `json`: Machine-readable JSON logs
/// - `pretty`: Human-readable formatted logs (default)
///
/// Log level is controlled via `RUST_LOG` environment variable.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let format = std::env::var("CHASSISD_LOG_FORMAT")
        .unwrap_or_else(|_| "pretty".to_string())
        .to_lowercase();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chassis_daemon=info,chassis_client=info"));

    match format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(false)
                .init();
        }
    }
}

/// Loads configuration, honoring a `CHASSISD_CONFIG` path override.
fn load_config() -> Result<DaemonConfig> {
    match std::env::var_os("CHASSISD_CONFIG") {
        Some(path) => DaemonConfig::load_from(&PathBuf::from(path)),
        None => DaemonConfig::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting chassisd");

    // Startup is fatal on malformed configuration: refusing to run beats
    // running with a partial or unknown enclosure fleet.
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            error!("Expected config at: {:?}", DaemonConfig::config_path());
            return Err(e);
        }
    };

    info!("Loaded configuration with {} enclosures", config.enclosures.len());

    let client = EnclosureClient::new(config.settings.request_timeout())
        .map_err(|e| DaemonError::Client(e.to_string()))?;
    let api: Arc<dyn EnclosureApi> = Arc::new(client);

    let store = Arc::new(SessionStore::new(config.enclosures.clone(), api));
    info!("Session store initialized with {} enclosures", store.len());

    // Create shutdown channel
    let (shutdown_tx, _) = broadcast::channel(1);

    // Set up signal handlers
    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        use futures::stream::StreamExt;
        while let Some(signal) = signals.next().await {
            match signal {
                SIGTERM => {
                    info!("Received SIGTERM, initiating graceful shutdown");
                    let _ = shutdown_tx_clone.send(());
                    break;
                }
                SIGINT => {
                    info!("Received SIGINT, initiating graceful shutdown");
                    let _ = shutdown_tx_clone.send(());
                    break;
                }
                _ => {}
            }
        }
    });

    // First cycle fires immediately, then every refresh interval until
    // shutdown.
    run_refresh_scheduler(
        store,
        config.settings.refresh_interval(),
        shutdown_tx.subscribe(),
    )
    .await;

    info!("chassisd shutdown complete");

    Ok(())
}
