// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background task that runs a sync cycle on every reconnect.

use std::sync::Arc;

use suvidha_core::{SuvidhaError, SyncOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::connectivity::ReconnectSubscription;
use crate::orchestrator::SyncOrchestrator;

pub struct SyncRunner {
    orchestrator: Arc<SyncOrchestrator>,
    retention_days: u32,
    sync_on_startup: bool,
}

impl SyncRunner {
    pub fn new(orchestrator: Arc<SyncOrchestrator>, retention_days: u32, sync_on_startup: bool) -> Self {
        Self {
            orchestrator,
            retention_days,
            sync_on_startup,
        }
    }

    /// Run until `cancel` fires.
    ///
    /// Holds the detector's reconnect subscription for its whole lifetime and
    /// releases it on return. A storage failure stops the runner and is
    /// returned; replay failures never do.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), SuvidhaError> {
        let reconnects = self.orchestrator.detector().subscribe()?;
        self.run_with(reconnects, cancel).await
    }

    /// Run on a subscription taken earlier from the orchestrator's detector.
    ///
    /// Reconnects reported between `subscribe` and this call are buffered in
    /// the subscription and trigger a cycle once the loop starts.
    pub async fn run_with(
        self,
        mut reconnects: ReconnectSubscription,
        cancel: CancellationToken,
    ) -> Result<(), SuvidhaError> {
        info!(
            retention_days = self.retention_days,
            sync_on_startup = self.sync_on_startup,
            "sync runner started"
        );

        if self.sync_on_startup && self.orchestrator.detector().is_online() {
            self.cycle().await?;
        }

        loop {
            tokio::select! {
                event = reconnects.recv() => {
                    let Some(event) = event else { break };
                    info!(at = %event.at, "connectivity restored");
                    self.cycle().await?;
                }
                _ = cancel.cancelled() => {
                    info!("sync runner shutting down");
                    break;
                }
            }
        }

        reconnects.unsubscribe();
        Ok(())
    }

    async fn cycle(&self) -> Result<SyncOutcome, SuvidhaError> {
        let outcome = self.orchestrator.run_cycle().await.inspect_err(|e| {
            error!(error = %e, "sync cycle aborted");
        })?;
        self.orchestrator
            .repository()
            .cleanup(self.retention_days)
            .await?;
        Ok(outcome)
    }
}
