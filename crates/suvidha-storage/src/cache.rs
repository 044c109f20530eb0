// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bill cache and user data store.

use serde_json::Value;
use suvidha_core::{CachedBill, SuvidhaError, UserDataEntry};
use tracing::debug;

use crate::database::Database;
use crate::queries::{bills, user_data};

/// Last-known bill snapshots for offline display.
#[derive(Clone)]
pub struct BillCache {
    db: Database,
}

impl BillCache {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Upsert each bill in turn.
    ///
    /// Each record is its own write. If one fails, the bills before it stay
    /// committed and the error is returned.
    pub async fn cache(&self, bills: &[CachedBill]) -> Result<usize, SuvidhaError> {
        for bill in bills {
            bills::upsert(&self.db, bill).await?;
        }
        debug!(count = bills.len(), "bills cached");
        Ok(bills.len())
    }

    /// Build entries from raw backend records and cache them.
    pub async fn cache_records(&self, records: Vec<Value>) -> Result<usize, SuvidhaError> {
        let bills = records
            .into_iter()
            .map(CachedBill::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        self.cache(&bills).await
    }

    pub async fn get_all(&self) -> Result<Vec<CachedBill>, SuvidhaError> {
        bills::get_all(&self.db).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<CachedBill>, SuvidhaError> {
        bills::get(&self.db, id).await
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<CachedBill>, SuvidhaError> {
        bills::list_for_user(&self.db, user_id).await
    }

    /// Drop every cached bill. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize, SuvidhaError> {
        bills::delete_all(&self.db).await
    }
}

/// Schemaless key/value data kept alongside the queue.
#[derive(Clone)]
pub struct UserDataStore {
    db: Database,
}

impl UserDataStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn set(&self, key: &str, value: &Value) -> Result<(), SuvidhaError> {
        user_data::set(&self.db, key, value).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, SuvidhaError> {
        user_data::get(&self.db, key).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool, SuvidhaError> {
        user_data::delete(&self.db, key).await
    }

    pub async fn entries(&self) -> Result<Vec<UserDataEntry>, SuvidhaError> {
        user_data::list(&self.db).await
    }
}
