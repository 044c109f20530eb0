// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schemaless key/value data. Last write wins.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use suvidha_core::types::to_db_timestamp;
use suvidha_core::{SuvidhaError, UserDataEntry};

use crate::database::{map_tr_err, Database};

/// Store `value` under `key`, replacing any previous value.
pub async fn set(db: &Database, key: &str, value: &Value) -> Result<(), SuvidhaError> {
    let key = key.to_string();
    let encoded = serde_json::to_string(value)
        .map_err(|e| SuvidhaError::InvalidRecord(format!("value for `{key}`: {e}")))?;
    let updated_at = to_db_timestamp(&Utc::now());

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_data (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, encoded, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch the value stored under `key`.
pub async fn get(db: &Database, key: &str) -> Result<Option<Value>, SuvidhaError> {
    let key = key.to_string();
    let raw: Option<String> = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM user_data WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;

    raw.map(|raw| serde_json::from_str(&raw).map_err(SuvidhaError::storage))
        .transpose()
}

/// Every stored entry, ordered by key.
pub async fn list(db: &Database) -> Result<Vec<UserDataEntry>, SuvidhaError> {
    let rows: Vec<(String, String)> = db
        .connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM user_data ORDER BY key ASC")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(key, raw)| {
            let value = serde_json::from_str(&raw).map_err(SuvidhaError::storage)?;
            Ok(UserDataEntry { key, value })
        })
        .collect()
}

/// Remove `key`. Returns `false` if it was not present.
pub async fn delete(db: &Database, key: &str) -> Result<bool, SuvidhaError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute("DELETE FROM user_data WHERE key = ?1", params![key])?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn last_write_wins() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("user.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        assert!(get(&db, "profile").await.unwrap().is_none());
        set(&db, "profile", &json!({"name": "Asha"})).await.unwrap();
        set(&db, "profile", &json!({"name": "Asha", "ward": 12})).await.unwrap();
        assert_eq!(
            get(&db, "profile").await.unwrap(),
            Some(json!({"name": "Asha", "ward": 12}))
        );

        set(&db, "kiosk_locale", &json!("hi-IN")).await.unwrap();
        let keys: Vec<_> = list(&db).await.unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["kiosk_locale", "profile"]);

        assert!(delete(&db, "profile").await.unwrap());
        assert!(!delete(&db, "profile").await.unwrap());
        assert!(get(&db, "profile").await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
