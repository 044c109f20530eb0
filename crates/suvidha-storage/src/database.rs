// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All reads and writes are serialized through tokio-rusqlite's single
//! background thread: every query function runs one closure via
//! `database.connection().call()`, so each record read-modify-write is atomic
//! with respect to every other operation on the same store.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use suvidha_config::model::StorageConfig;
use suvidha_core::{HealthStatus, SuvidhaError};
use tracing::{debug, info};

use crate::migrations;

/// Handle to the durable store.
///
/// Cloning is cheap and every clone talks to the same background connection.
/// Construct one per process and pass it to the repository, bill cache, and
/// user data store.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

/// Convert a tokio-rusqlite error into [`SuvidhaError::StorageUnavailable`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> SuvidhaError {
    SuvidhaError::StorageUnavailable {
        source: Box::new(e),
    }
}

impl Database {
    /// Open (or create) the store at `path` with WAL enabled and migrations applied.
    pub async fn open(path: &str) -> Result<Self, SuvidhaError> {
        Self::open_with(path, true).await
    }

    /// Open the store described by a [`StorageConfig`].
    pub async fn from_config(config: &StorageConfig) -> Result<Self, SuvidhaError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    /// Open (or create) the store at `path`.
    ///
    /// Creates the parent directory if needed, applies PRAGMAs, and runs any
    /// pending migrations. Opening an already-provisioned store applies nothing.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, SuvidhaError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(SuvidhaError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| SuvidhaError::StorageUnavailable {
                source: Box::new(e),
            })?;

        let applied = conn
            .call(move |conn| {
                if wal_mode {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    debug!(journal_mode = %mode, "journal mode set");
                }
                conn.busy_timeout(Duration::from_secs(5))?;
                conn.execute_batch(
                    "PRAGMA synchronous = NORMAL;
                     PRAGMA foreign_keys = ON;",
                )?;
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)??;

        info!(path, applied, "offline store opened");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Highest schema version applied to this store.
    pub async fn schema_version(&self) -> Result<i64, SuvidhaError> {
        self.conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COALESCE(MAX(version), 0) FROM refinery_schema_history",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(map_tr_err)
    }

    /// Run a trivial query to confirm the store is still usable.
    pub async fn health_check(&self) -> HealthStatus {
        let result = self
            .conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        match result {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }

    /// Checkpoint the WAL and close the connection.
    ///
    /// Every clone of this handle becomes unusable afterwards.
    pub async fn close(self) -> Result<(), SuvidhaError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        self.conn
            .close()
            .await
            .map_err(|e| SuvidhaError::StorageUnavailable {
                source: Box::new(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/kiosk/offline.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_provisions_all_collections() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("tables.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                     ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        for expected in ["cached_bills", "pending_transactions", "user_data"] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}: {tables:?}");
        }

        let indexes: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare("SELECT name FROM sqlite_master WHERE type = 'index'")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert!(indexes.iter().any(|i| i == "idx_pending_transactions_status"));
        assert!(indexes.iter().any(|i| i == "idx_cached_bills_user_id"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        let db = Database::open(path).await.unwrap();
        let first = db.schema_version().await.unwrap();
        db.close().await.unwrap();

        let db = Database::open(path).await.unwrap();
        let second = db.schema_version().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second, migrations::latest_version());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert_eq!(db.health_check().await, HealthStatus::Healthy);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unwritable_location_is_storage_unavailable() {
        let dir = tempdir().unwrap();
        // A regular file cannot act as a parent directory.
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let db_path = blocker.join("offline.db");

        let Err(err) = Database::open(db_path.to_str().unwrap()).await else {
            panic!("opening beneath a regular file should fail");
        };
        assert!(matches!(err, SuvidhaError::StorageUnavailable { .. }), "got: {err}");
    }
}
