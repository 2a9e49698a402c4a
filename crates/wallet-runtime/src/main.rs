//! # Wallet Runtime Binary
//!
//! Runs the orchestration core over the in-memory reference services.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging + metrics)
//! 2. Load configuration from the environment
//! 3. Open snapshot storage (persistence enabled only)
//! 4. Start the runtime and attach a logging replica
//! 5. Run until Ctrl+C, then shut down gracefully

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use shared_types::ServiceId;
use tracing::{debug, info, warn};
use wallet_runtime::storage::open_storage;
use wallet_runtime::{
    ReplicaEndpoint, ReplicaMirror, RuntimeConfig, RuntimeOptions, ServiceStatus, WalletRuntime,
};
use wallet_services::adapters::preferences::PREF_BALANCE_POLL_SECS;
use wallet_services::ReferenceLauncher;
use wallet_telemetry::{init_telemetry, TelemetryConfig};

/// Longest wait for every service before the first status report.
const STATUS_REPORT_AFTER: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  Wallet Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = RuntimeConfig::from_env();
    info!(
        persist_state = config.persist_state,
        backend = %config.storage_backend,
        "[runtime] Configuration loaded"
    );

    let storage = if config.persist_state {
        Some(open_storage(&config).context("Failed to open snapshot storage")?)
    } else {
        None
    };

    let runtime = WalletRuntime::start(
        RuntimeOptions::from_config(&config, storage),
        Arc::new(reference_launcher()),
    )
    .await;

    tokio::spawn(log_replica(runtime.attach_replica()));

    let board = runtime.status_board();
    tokio::spawn(async move {
        let all_running = async {
            for id in ServiceId::all() {
                board.wait_for(id, ServiceStatus::Running).await;
            }
        };
        if tokio::time::timeout(STATUS_REPORT_AFTER, all_running).await.is_err() {
            warn!("[runtime] Not every service is running yet");
        }
        board.log_status();
    });

    info!("Wallet runtime is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.status_board().log_status();
    runtime.shutdown().await;
    Ok(())
}

/// Reference services, with the balance poll period taken from
/// `WALLET_BALANCE_POLL_SECS` when set.
fn reference_launcher() -> ReferenceLauncher {
    let launcher = ReferenceLauncher::new();
    match env::var("WALLET_BALANCE_POLL_SECS") {
        Ok(secs) => launcher.with_preference(PREF_BALANCE_POLL_SECS, secs),
        Err(_) => launcher,
    }
}

/// Mirror the store and log every version it reaches.
async fn log_replica(mut endpoint: ReplicaEndpoint) {
    let mut mirror = ReplicaMirror::new();
    while let Some(text) = endpoint.recv().await {
        match mirror.apply_text(&text) {
            Ok(true) => debug!(
                replica = endpoint.id(),
                version = mirror.version(),
                accounts = mirror.state().account.balances.len(),
                "[replica] Mirror advanced"
            ),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "[replica] Undecodable message"),
        }
    }
}
