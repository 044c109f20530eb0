// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transaction Repository: the queue of locally recorded writes awaiting replay.

use chrono::{DateTime, Utc};
use serde_json::Value;
use suvidha_core::{
    Lease, PendingTransaction, StatusCounts, SuvidhaError, TransactionId, TransactionStatus,
};
use tracing::{debug, info};

use crate::database::Database;
use crate::queries::transactions;

/// Age threshold used by [`TransactionRepository::cleanup`] when the caller
/// has no configured retention.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Repository over the `pending_transactions` collection.
///
/// Cheap to clone; every clone shares the same [`Database`] handle.
#[derive(Clone)]
pub struct TransactionRepository {
    db: Database,
}

impl TransactionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Persist a new `pending` transaction and return it with its assigned fields.
    pub async fn enqueue(&self, payload: Value) -> Result<PendingTransaction, SuvidhaError> {
        let tx = transactions::enqueue(&self.db, &payload).await?;
        debug!(id = tx.id, "transaction queued");
        Ok(tx)
    }

    pub async fn get(&self, id: TransactionId) -> Result<Option<PendingTransaction>, SuvidhaError> {
        transactions::get(&self.db, id).await
    }

    /// All `pending` transactions, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<PendingTransaction>, SuvidhaError> {
        transactions::list_by_status(&self.db, TransactionStatus::Pending).await
    }

    /// Every transaction in any status, oldest first.
    pub async fn list_all(&self) -> Result<Vec<PendingTransaction>, SuvidhaError> {
        transactions::list_all(&self.db).await
    }

    pub async fn list_by_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<PendingTransaction>, SuvidhaError> {
        transactions::list_by_status(&self.db, status).await
    }

    pub async fn count_by_status(&self) -> Result<StatusCounts, SuvidhaError> {
        transactions::count_by_status(&self.db).await
    }

    /// Mark a pending transaction as synced.
    ///
    /// Returns `false` if the id is absent, claimed by a sync cycle, or terminal.
    pub async fn mark_synced(
        &self,
        id: TransactionId,
        server_response: &Value,
    ) -> Result<bool, SuvidhaError> {
        let changed = transactions::mark_synced(&self.db, id, server_response).await?;
        if !changed {
            debug!(id, "mark_synced ignored: not pending");
        }
        Ok(changed)
    }

    /// Mark a pending transaction as failed and count the attempt.
    ///
    /// Returns `false` if the id is absent, claimed by a sync cycle, or terminal.
    pub async fn mark_failed(&self, id: TransactionId, error: &str) -> Result<bool, SuvidhaError> {
        let changed = transactions::mark_failed(&self.db, id, error).await?;
        if !changed {
            debug!(id, "mark_failed ignored: not pending");
        }
        Ok(changed)
    }

    /// Take an exclusive lease on a pending transaction before replaying it.
    pub async fn claim(
        &self,
        id: TransactionId,
        lease_for: std::time::Duration,
    ) -> Result<Option<Lease>, SuvidhaError> {
        let lease_for = chrono::Duration::from_std(lease_for)
            .map_err(|e| SuvidhaError::Internal(format!("lease duration out of range: {e}")))?;
        transactions::claim(&self.db, id, lease_for).await
    }

    pub async fn settle_synced(&self, lease: &Lease, server_response: &Value) -> Result<bool, SuvidhaError> {
        transactions::settle_synced(&self.db, lease, server_response).await
    }

    pub async fn settle_failed(&self, lease: &Lease, error: &str) -> Result<bool, SuvidhaError> {
        transactions::settle_failed(&self.db, lease, error).await
    }

    /// Return transactions held under an expired lease to `pending`.
    pub async fn release_expired_leases(&self) -> Result<usize, SuvidhaError> {
        let released = transactions::release_expired_leases(&self.db, Utc::now()).await?;
        if released > 0 {
            info!(released, "released expired replay leases");
        }
        Ok(released)
    }

    /// Move failed transactions with fewer than `max_attempts` attempts back to `pending`.
    pub async fn requeue_failed(&self, max_attempts: u32) -> Result<usize, SuvidhaError> {
        let requeued = transactions::requeue_failed(&self.db, max_attempts).await?;
        if requeued > 0 {
            info!(requeued, max_attempts, "requeued failed transactions");
        }
        Ok(requeued)
    }

    /// Delete synced transactions whose `synced_at` is older than `days_old` days.
    pub async fn cleanup(&self, days_old: u32) -> Result<usize, SuvidhaError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days_old));
        self.cleanup_before(cutoff).await
    }

    /// Delete synced transactions whose `synced_at` is before `cutoff`.
    pub async fn cleanup_before(&self, cutoff: DateTime<Utc>) -> Result<usize, SuvidhaError> {
        let deleted = transactions::delete_synced_before(&self.db, cutoff).await?;
        info!(deleted, cutoff = %cutoff, "cleaned up synced transactions");
        Ok(deleted)
    }
}
