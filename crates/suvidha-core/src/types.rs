// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared by the storage, sync, and CLI crates.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::SuvidhaError;

/// Locally-assigned identifier of a queued transaction.
///
/// Assigned by the durable store at enqueue time, strictly increasing and
/// never reused.
pub type TransactionId = i64;

/// Health status reported by storage health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Store is fully operational.
    Healthy,
    /// Store is not operational.
    Unhealthy(String),
}

/// Lifecycle state of a queued transaction.
///
/// `Synced` and `Failed` are terminal for a replay: neither `mark_synced`
/// nor `mark_failed` moves a record out of them. Only the explicit
/// requeue path returns a `Failed` record to `Pending`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    /// Waiting for the next sync cycle.
    Pending,
    /// Claimed by a sync cycle that is replaying it right now.
    InFlight,
    /// Accepted by the backend.
    Synced,
    /// Rejected by the backend or lost to a transport error.
    Failed,
}

impl TransactionStatus {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::InFlight => "in_flight",
            TransactionStatus::Synced => "synced",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Synced | TransactionStatus::Failed)
    }
}

/// A locally queued write waiting to reach the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: TransactionId,
    /// Opaque request body supplied by the caller; never interpreted.
    pub payload: Value,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    /// Number of failed replay attempts.
    pub sync_attempts: u32,
    pub synced_at: Option<DateTime<Utc>>,
    pub server_response: Option<Value>,
    pub error: Option<String>,
}

/// Proof that a sync cycle holds the exclusive right to resolve a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub transaction_id: TransactionId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Per-status record counts for status reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub in_flight: u64,
    pub synced: u64,
    pub failed: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.in_flight + self.synced + self.failed
    }
}

/// Aggregate result of one sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Transactions the backend accepted during the cycle.
    pub synced: usize,
    /// Transactions whose replay failed during the cycle.
    pub failed: usize,
    /// Snapshot entries this cycle did not resolve: claimed elsewhere first,
    /// or the lease expired before the result was recorded.
    pub skipped: usize,
}

impl SyncOutcome {
    pub fn attempted(&self) -> usize {
        self.synced + self.failed
    }
}

/// A last-known snapshot of a remote bill, kept for offline display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedBill {
    pub id: String,
    /// Owner of the bill, when the record carries one.
    pub user_id: Option<String>,
    /// The full bill record as returned by the backend.
    pub record: Value,
    pub cached_at: DateTime<Utc>,
}

impl CachedBill {
    /// Build a cache entry from a raw backend bill record.
    ///
    /// The record must carry an `id` (string or number). A `user_id` field,
    /// when present, becomes the owner key.
    pub fn from_record(record: Value) -> Result<Self, SuvidhaError> {
        let id = record
            .get("id")
            .and_then(key_string)
            .ok_or_else(|| SuvidhaError::InvalidRecord("bill record has no `id`".into()))?;
        let user_id = record.get("user_id").and_then(key_string);
        Ok(Self {
            id,
            user_id,
            record,
            cached_at: db_now(),
        })
    }
}

fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A schemaless key/value association. Last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDataEntry {
    pub key: String,
    pub value: Value,
}

/// Network reachability as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Reachability {
    Online,
    Offline,
}

impl Reachability {
    pub fn from_online(online: bool) -> Self {
        if online {
            Reachability::Online
        } else {
            Reachability::Offline
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Reachability::Online)
    }
}

/// Format a timestamp for storage.
///
/// Fixed-width millisecond precision keeps lexical order equal to time order,
/// which the status and cleanup queries rely on.
pub fn to_db_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time truncated to the precision [`to_db_timestamp`] keeps.
///
/// Records returned to callers carry this value so they equal what a later
/// read yields.
pub fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Parse a timestamp written by [`to_db_timestamp`].
pub fn from_db_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_strum() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::InFlight,
            TransactionStatus::Synced,
            TransactionStatus::Failed,
        ] {
            assert_eq!(status.to_string(), status.as_str());
            assert_eq!(TransactionStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn only_synced_and_failed_are_terminal() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::InFlight.is_terminal());
        assert!(TransactionStatus::Synced.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
    }

    #[test]
    fn cached_bill_takes_numeric_id_and_owner() {
        let bill = CachedBill::from_record(json!({"id": 42, "user_id": 7, "total_amount": "500.00"}))
            .unwrap();
        assert_eq!(bill.id, "42");
        assert_eq!(bill.user_id.as_deref(), Some("7"));
        assert_eq!(bill.record["total_amount"], "500.00");
    }

    #[test]
    fn cached_bill_without_id_is_rejected() {
        let err = CachedBill::from_record(json!({"bill_number": "EL-1"})).unwrap_err();
        assert!(matches!(err, SuvidhaError::InvalidRecord(_)));
    }

    #[test]
    fn db_timestamps_sort_lexically() {
        let early = from_db_timestamp("2026-01-01T09:00:00.000Z").unwrap();
        let late = early + chrono::Duration::milliseconds(1500);
        let (a, b) = (to_db_timestamp(&early), to_db_timestamp(&late));
        assert!(a < b);
        assert_eq!(from_db_timestamp(&b).unwrap(), late);
    }

    #[test]
    fn db_now_survives_a_storage_round_trip() {
        let now = db_now();
        assert_eq!(from_db_timestamp(&to_db_timestamp(&now)).unwrap(), now);

        let bill = CachedBill::from_record(json!({"id": "B-1"})).unwrap();
        let stored = from_db_timestamp(&to_db_timestamp(&bill.cached_at)).unwrap();
        assert_eq!(stored, bill.cached_at);
    }
}
