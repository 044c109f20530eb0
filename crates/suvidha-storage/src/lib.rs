// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Suvidha offline sync engine.
//!
//! Provides a WAL-mode SQLite store with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations over three
//! collections: queued transactions, cached bills, and user data.

pub mod cache;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod repository;

pub use cache::{BillCache, UserDataStore};
pub use database::Database;
pub use models::*;
pub use repository::{TransactionRepository, DEFAULT_RETENTION_DAYS};
