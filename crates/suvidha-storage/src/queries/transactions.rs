// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-transaction queue operations.
//!
//! Status transitions:
//!
//! ```text
//! pending --claim--> in_flight --settle--> synced | failed
//!    ^                  |                              |
//!    +--lease expired---+            requeue_failed ---+ (failed only)
//! ```
//!
//! `mark_synced`/`mark_failed` resolve only `pending` records. A claimed
//! record can be resolved only through the `settle_*` variants, by the holder
//! of its lease.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;
use suvidha_core::types::{db_now, from_db_timestamp, to_db_timestamp};
use suvidha_core::{
    Lease, PendingTransaction, StatusCounts, SuvidhaError, TransactionId, TransactionStatus,
};

use crate::database::{map_tr_err, Database};

const SELECT_COLUMNS: &str = "SELECT id, payload, status, created_at, sync_attempts, synced_at,
        server_response, error
 FROM pending_transactions";

/// Insert a new `pending` transaction and return the stored record.
pub async fn enqueue(db: &Database, payload: &Value) -> Result<PendingTransaction, SuvidhaError> {
    let payload = payload.clone();
    let encoded = serde_json::to_string(&payload)
        .map_err(|e| SuvidhaError::InvalidRecord(format!("payload is not serializable: {e}")))?;
    let created_at = db_now();
    let created_at_raw = to_db_timestamp(&created_at);

    let id = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pending_transactions (payload, status, created_at, sync_attempts)
                 VALUES (?1, 'pending', ?2, 0)",
                params![encoded, created_at_raw],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)?;

    Ok(PendingTransaction {
        id,
        payload,
        status: TransactionStatus::Pending,
        created_at,
        sync_attempts: 0,
        synced_at: None,
        server_response: None,
        error: None,
    })
}

/// Get a transaction by ID.
pub async fn get(db: &Database, id: TransactionId) -> Result<Option<PendingTransaction>, SuvidhaError> {
    db.connection()
        .call(move |conn| {
            let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
            conn.query_row(&sql, params![id], row_to_transaction)
                .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// List transactions with the given status, oldest first.
///
/// Ties on `created_at` are broken by `id`, which is assigned in enqueue order.
pub async fn list_by_status(
    db: &Database,
    status: TransactionStatus,
) -> Result<Vec<PendingTransaction>, SuvidhaError> {
    db.connection()
        .call(move |conn| {
            let sql = format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY created_at ASC, id ASC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![status.as_str()], row_to_transaction)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// List every transaction regardless of status, oldest first.
pub async fn list_all(db: &Database) -> Result<Vec<PendingTransaction>, SuvidhaError> {
    db.connection()
        .call(|conn| {
            let sql = format!("{SELECT_COLUMNS} ORDER BY created_at ASC, id ASC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_transaction)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Count records per status.
pub async fn count_by_status(db: &Database) -> Result<StatusCounts, SuvidhaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn
                .prepare("SELECT status, COUNT(*) FROM pending_transactions GROUP BY status")?;
            let mut rows = stmt.query([])?;
            let mut counts = StatusCounts::default();
            while let Some(row) = rows.next()? {
                let status: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                let count = count as u64;
                match status.as_str() {
                    "pending" => counts.pending = count,
                    "in_flight" => counts.in_flight = count,
                    "synced" => counts.synced = count,
                    "failed" => counts.failed = count,
                    _ => {}
                }
            }
            Ok(counts)
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a `pending` record to `synced`.
///
/// Returns `false` (not an error) when the id is absent, claimed, or terminal.
pub async fn mark_synced(
    db: &Database,
    id: TransactionId,
    server_response: &Value,
) -> Result<bool, SuvidhaError> {
    resolve_synced(db, id, None, server_response).await
}

/// Transition a `pending` record to `failed`, counting the attempt.
///
/// Returns `false` (not an error) when the id is absent, claimed, or terminal.
pub async fn mark_failed(db: &Database, id: TransactionId, error: &str) -> Result<bool, SuvidhaError> {
    resolve_failed(db, id, None, error).await
}

/// Atomically move a `pending` record to `in_flight` under a fresh lease.
///
/// Returns `None` if the record is absent or is no longer `pending` (another
/// cycle claimed it first, or it already reached a terminal state).
pub async fn claim(
    db: &Database,
    id: TransactionId,
    lease_for: chrono::Duration,
) -> Result<Option<Lease>, SuvidhaError> {
    let token = uuid::Uuid::new_v4().to_string();
    let expires_at = db_now() + lease_for;
    let expires_raw = to_db_timestamp(&expires_at);
    let lease_token = token.clone();

    let claimed = db
        .connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE pending_transactions
                 SET status = 'in_flight', claim_token = ?1, lease_expires_at = ?2
                 WHERE id = ?3 AND status = 'pending'",
                params![lease_token, expires_raw, id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)?;

    Ok(claimed.then_some(Lease {
        transaction_id: id,
        token,
        expires_at,
    }))
}

/// Resolve a leased record as `synced`. Returns `false` if the lease was lost.
pub async fn settle_synced(
    db: &Database,
    lease: &Lease,
    server_response: &Value,
) -> Result<bool, SuvidhaError> {
    resolve_synced(db, lease.transaction_id, Some(lease.token.clone()), server_response).await
}

/// Resolve a leased record as `failed`. Returns `false` if the lease was lost.
pub async fn settle_failed(db: &Database, lease: &Lease, error: &str) -> Result<bool, SuvidhaError> {
    resolve_failed(db, lease.transaction_id, Some(lease.token.clone()), error).await
}

/// Return `in_flight` records whose lease expired before `now` to `pending`.
pub async fn release_expired_leases(db: &Database, now: DateTime<Utc>) -> Result<usize, SuvidhaError> {
    let now_raw = to_db_timestamp(&now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE pending_transactions
                 SET status = 'pending', claim_token = NULL, lease_expires_at = NULL
                 WHERE status = 'in_flight' AND lease_expires_at < ?1",
                params![now_raw],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Return `failed` records with fewer than `max_attempts` attempts to `pending`.
///
/// `sync_attempts` is preserved so the cap holds across repeated requeues.
pub async fn requeue_failed(db: &Database, max_attempts: u32) -> Result<usize, SuvidhaError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE pending_transactions
                 SET status = 'pending', error = NULL
                 WHERE status = 'failed' AND sync_attempts < ?1",
                params![max_attempts],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Delete `synced` records whose `synced_at` is strictly before `cutoff`.
///
/// `pending`, `in_flight`, and `failed` records are never deleted.
pub async fn delete_synced_before(db: &Database, cutoff: DateTime<Utc>) -> Result<usize, SuvidhaError> {
    let cutoff_raw = to_db_timestamp(&cutoff);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM pending_transactions
                 WHERE status = 'synced' AND synced_at IS NOT NULL AND synced_at < ?1",
                params![cutoff_raw],
            )
        })
        .await
        .map_err(map_tr_err)
}

async fn resolve_synced(
    db: &Database,
    id: TransactionId,
    claim_token: Option<String>,
    server_response: &Value,
) -> Result<bool, SuvidhaError> {
    let response = serde_json::to_string(server_response)
        .map_err(|e| SuvidhaError::InvalidRecord(format!("response is not serializable: {e}")))?;
    let synced_at = to_db_timestamp(&Utc::now());

    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE pending_transactions
                 SET status = 'synced', synced_at = ?1, server_response = ?2, error = NULL,
                     claim_token = NULL, lease_expires_at = NULL
                 WHERE id = ?3
                   AND (
                     (?4 IS NULL AND status = 'pending')
                     OR (status = 'in_flight' AND claim_token = ?4)
                   )",
                params![synced_at, response, id, claim_token],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

async fn resolve_failed(
    db: &Database,
    id: TransactionId,
    claim_token: Option<String>,
    error: &str,
) -> Result<bool, SuvidhaError> {
    let error = error.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE pending_transactions
                 SET status = 'failed', error = ?1, sync_attempts = sync_attempts + 1,
                     claim_token = NULL, lease_expires_at = NULL
                 WHERE id = ?2
                   AND (
                     (?3 IS NULL AND status = 'pending')
                     OR (status = 'in_flight' AND claim_token = ?3)
                   )",
                params![error, id, claim_token],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<PendingTransaction> {
    let payload: String = row.get(1)?;
    let status: String = row.get(2)?;
    let created_at: String = row.get(3)?;
    let synced_at: Option<String> = row.get(5)?;
    let server_response: Option<String> = row.get(6)?;

    Ok(PendingTransaction {
        id: row.get(0)?,
        payload: serde_json::from_str(&payload).map_err(|e| conversion_err(1, e))?,
        status: TransactionStatus::from_str(&status).map_err(|e| conversion_err(2, e))?,
        created_at: from_db_timestamp(&created_at).map_err(|e| conversion_err(3, e))?,
        sync_attempts: row.get(4)?,
        synced_at: synced_at
            .map(|raw| from_db_timestamp(&raw))
            .transpose()
            .map_err(|e| conversion_err(5, e))?,
        server_response: server_response
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| conversion_err(6, e))?,
        error: row.get(7)?,
    })
}

fn conversion_err<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}
