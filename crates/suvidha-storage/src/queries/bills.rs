// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached bill snapshots, keyed by bill id and indexed by owner.

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use suvidha_core::types::{from_db_timestamp, to_db_timestamp};
use suvidha_core::{CachedBill, SuvidhaError};

use crate::database::{map_tr_err, Database};

/// Insert or replace one bill, keyed by id.
pub async fn upsert(db: &Database, bill: &CachedBill) -> Result<(), SuvidhaError> {
    let id = bill.id.clone();
    let user_id = bill.user_id.clone();
    let record = serde_json::to_string(&bill.record)
        .map_err(|e| SuvidhaError::InvalidRecord(format!("bill {id}: {e}")))?;
    let cached_at = to_db_timestamp(&bill.cached_at);

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO cached_bills (id, user_id, record, cached_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     user_id = excluded.user_id,
                     record = excluded.record,
                     cached_at = excluded.cached_at",
                params![id, user_id, record, cached_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All cached bills, ordered by id.
pub async fn get_all(db: &Database) -> Result<Vec<CachedBill>, SuvidhaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, record, cached_at FROM cached_bills ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], row_to_bill)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a single cached bill.
pub async fn get(db: &Database, id: &str) -> Result<Option<CachedBill>, SuvidhaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, user_id, record, cached_at FROM cached_bills WHERE id = ?1",
                params![id],
                row_to_bill,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Cached bills belonging to `user_id`, ordered by id.
pub async fn list_for_user(db: &Database, user_id: &str) -> Result<Vec<CachedBill>, SuvidhaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, record, cached_at FROM cached_bills
                 WHERE user_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![user_id], row_to_bill)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Remove every cached bill. Returns the number removed.
pub async fn delete_all(db: &Database) -> Result<usize, SuvidhaError> {
    db.connection()
        .call(|conn| conn.execute("DELETE FROM cached_bills", []))
        .await
        .map_err(map_tr_err)
}

fn row_to_bill(row: &Row<'_>) -> rusqlite::Result<CachedBill> {
    let record: String = row.get(2)?;
    let cached_at: String = row.get(3)?;
    Ok(CachedBill {
        id: row.get(0)?,
        user_id: row.get(1)?,
        record: serde_json::from_str(&record).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
        })?,
        cached_at: from_db_timestamp(&cached_at).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
        })?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("bills.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn bill(record: serde_json::Value) -> CachedBill {
        CachedBill::from_record(record).unwrap()
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let (db, _dir) = setup_db().await;

        let first = bill(json!({"id": 1, "user_id": "u1", "amount": 100}));
        let second = bill(json!({"id": 1, "user_id": "u1", "amount": 250}));
        upsert(&db, &first).await.unwrap();
        upsert(&db, &second).await.unwrap();

        let all = get_all(&db).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].record["amount"], 250);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_for_user_filters_by_owner() {
        let (db, _dir) = setup_db().await;

        let bills = vec![
            bill(json!({"id": "E-1", "user_id": "u1"})),
            bill(json!({"id": "E-2", "user_id": "u2"})),
            bill(json!({"id": "W-1", "user_id": "u1"})),
            bill(json!({"id": "G-1"})),
        ];
        for b in &bills {
            upsert(&db, b).await.unwrap();
        }

        let ids: Vec<_> = list_for_user(&db, "u1")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["E-1", "W-1"]);
        assert!(list_for_user(&db, "nobody").await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_and_delete_all() {
        let (db, _dir) = setup_db().await;

        upsert(&db, &bill(json!({"id": 9, "status": "due"})))
            .await
            .unwrap();
        let found = get(&db, "9").await.unwrap().unwrap();
        assert_eq!(found.record["status"], "due");
        assert!(found.user_id.is_none());

        assert_eq!(delete_all(&db).await.unwrap(), 1);
        assert!(get(&db, "9").await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
