// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-dir store harness.
//!
//! `TestStore` opens a real offline store in a fresh temporary directory and
//! hands out the repository, bill cache, and user data store over it. The
//! directory lives as long as the harness.

use suvidha_core::SuvidhaError;
use suvidha_storage::{BillCache, Database, TransactionRepository, UserDataStore};

pub struct TestStore {
    db: Database,
    dir: tempfile::TempDir,
}

impl TestStore {
    pub async fn new() -> Result<Self, SuvidhaError> {
        let dir = tempfile::TempDir::new().map_err(SuvidhaError::storage)?;
        let db_path = dir.path().join("suvidha-offline.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;
        Ok(Self { db, dir })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn repository(&self) -> TransactionRepository {
        TransactionRepository::new(self.db.clone())
    }

    pub fn bill_cache(&self) -> BillCache {
        BillCache::new(self.db.clone())
    }

    pub fn user_data(&self) -> UserDataStore {
        UserDataStore::new(self.db.clone())
    }

    /// Checkpoint and close the store. The directory is removed on drop.
    pub async fn close(self) -> Result<(), SuvidhaError> {
        self.db.close().await
    }
}
