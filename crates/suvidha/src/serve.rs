// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `suvidha serve` command implementation.
//!
//! Opens the offline store, starts the reachability probe and the sync
//! runner, and keeps them running until SIGINT or SIGTERM.

use std::sync::Arc;

use suvidha_config::SuvidhaConfig;
use suvidha_core::{Reachability, SuvidhaError};
use suvidha_storage::{Database, TransactionRepository};
use suvidha_sync::{
    token_source_from_config, ConnectivityDetector, HttpReplayTransport, ReachabilityProbe,
    SyncOrchestrator, SyncRunner, SyncSettings,
};
use tracing::{error, info};

use crate::shutdown;

/// Runs the sync engine until a shutdown signal arrives.
pub async fn run_serve(config: SuvidhaConfig) -> Result<(), SuvidhaError> {
    info!(kiosk = %config.kiosk.name, "starting suvidha sync engine");

    let db = Database::from_config(&config.storage).await?;
    let repo = TransactionRepository::new(db.clone());
    let counts = repo.count_by_status().await?;
    info!(
        pending = counts.pending,
        in_flight = counts.in_flight,
        failed = counts.failed,
        "offline queue loaded"
    );

    let detector = if config.connectivity.assume_online {
        ConnectivityDetector::new(Reachability::Online)
    } else {
        ConnectivityDetector::new(Reachability::Offline)
    };

    let tokens = token_source_from_config(&config.backend);
    let transport = HttpReplayTransport::new(&config.backend, tokens)?;
    info!(endpoint = transport.endpoint(), "replay transport ready");

    let orchestrator = Arc::new(SyncOrchestrator::new(
        repo,
        Arc::new(transport),
        detector.clone(),
        SyncSettings::from(&config.sync),
    ));

    let cancel = shutdown::install_signal_handler();

    // Attach before the probe starts so its first Online report is not lost.
    let reconnects = detector.subscribe()?;

    let probe_task = if config.connectivity.assume_online {
        info!("connectivity.assume_online set, reachability probe disabled");
        None
    } else {
        let probe = ReachabilityProbe::from_config(&config.connectivity, &config.backend)?;
        Some(tokio::spawn(probe.run(detector.clone(), cancel.clone())))
    };

    let runner = SyncRunner::new(
        orchestrator,
        config.storage.retention_days,
        config.sync.sync_on_startup,
    );
    let result = runner.run_with(reconnects, cancel.clone()).await;
    if let Err(e) = &result {
        error!(error = %e, "sync runner stopped");
    }

    // Stop the probe whether the runner exited on a signal or on an error.
    cancel.cancel();
    if let Some(task) = probe_task
        && let Err(e) = task.await
    {
        error!(error = %e, "reachability probe task failed");
    }

    db.close().await?;
    info!("suvidha sync engine stopped");
    result
}

/// Initializes the tracing subscriber with the given log level.
///
/// Output goes to stderr so command output on stdout stays machine-readable.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("suvidha={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
