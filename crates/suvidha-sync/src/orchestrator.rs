// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync orchestrator: drains the pending queue against the backend.
//!
//! One cycle:
//!
//! 1. If the detector reports offline, return a zero outcome without touching
//!    the store or the network.
//! 2. Return records held under expired leases to `pending`.
//! 3. With `auto_requeue`, move retryable `failed` records back to `pending`.
//! 4. Snapshot `list_pending()` once. Records enqueued later wait for the
//!    next cycle.
//! 5. For each record, oldest first and one at a time: claim it, replay it,
//!    and settle it under the lease. A record another cycle already claimed
//!    is skipped.
//!
//! Replay failures are recorded on the record and never end the cycle.
//! Storage failures end the cycle and are returned.

use std::sync::Arc;
use std::time::Duration;

use suvidha_config::model::SyncConfig;
use suvidha_core::{ReplayTransport, SuvidhaError, SyncOutcome};
use suvidha_storage::TransactionRepository;
use tracing::{debug, info, warn};

use crate::connectivity::ConnectivityDetector;

/// Tunables for a sync cycle.
#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub lease_timeout: Duration,
    pub auto_requeue: bool,
    pub max_attempts: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            lease_timeout: Duration::from_secs(config.lease_timeout_secs),
            auto_requeue: config.auto_requeue,
            max_attempts: config.max_attempts,
        }
    }
}

pub struct SyncOrchestrator {
    repo: TransactionRepository,
    transport: Arc<dyn ReplayTransport>,
    detector: ConnectivityDetector,
    settings: SyncSettings,
}

impl SyncOrchestrator {
    pub fn new(
        repo: TransactionRepository,
        transport: Arc<dyn ReplayTransport>,
        detector: ConnectivityDetector,
        settings: SyncSettings,
    ) -> Self {
        Self {
            repo,
            transport,
            detector,
            settings,
        }
    }

    pub fn repository(&self) -> &TransactionRepository {
        &self.repo
    }

    pub fn detector(&self) -> &ConnectivityDetector {
        &self.detector
    }

    /// Run one sync cycle. See the module docs for the steps.
    pub async fn run_cycle(&self) -> Result<SyncOutcome, SuvidhaError> {
        if !self.detector.is_online() {
            debug!("offline, skipping sync cycle");
            return Ok(SyncOutcome::default());
        }

        self.repo.release_expired_leases().await?;
        if self.settings.auto_requeue {
            self.repo.requeue_failed(self.settings.max_attempts).await?;
        }

        let snapshot = self.repo.list_pending().await?;
        if snapshot.is_empty() {
            debug!("nothing pending");
            return Ok(SyncOutcome::default());
        }
        info!(pending = snapshot.len(), "sync cycle started");

        let mut outcome = SyncOutcome::default();
        for tx in snapshot {
            let Some(lease) = self.repo.claim(tx.id, self.settings.lease_timeout).await? else {
                warn!(id = tx.id, "transaction already claimed or resolved, skipping");
                outcome.skipped += 1;
                continue;
            };

            let settled = match self.transport.replay(&tx.payload).await {
                Ok(response) => {
                    let settled = self.repo.settle_synced(&lease, &response).await?;
                    if settled {
                        debug!(id = tx.id, "transaction synced");
                        outcome.synced += 1;
                    }
                    settled
                }
                Err(e) => {
                    let settled = self.repo.settle_failed(&lease, &e.recorded_text()).await?;
                    if settled {
                        warn!(id = tx.id, error = %e, "transaction replay failed");
                        outcome.failed += 1;
                    }
                    settled
                }
            };

            if !settled {
                warn!(id = tx.id, "lease expired before the replay was recorded");
                outcome.skipped += 1;
            }
        }

        info!(
            attempted = outcome.attempted(),
            synced = outcome.synced,
            failed = outcome.failed,
            skipped = outcome.skipped,
            "sync cycle finished"
        );
        Ok(outcome)
    }
}
