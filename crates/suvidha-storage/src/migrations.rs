// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

use suvidha_core::SuvidhaError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history`
/// table, so re-running against a provisioned store applies nothing.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, SuvidhaError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(SuvidhaError::storage)?;
    Ok(report.applied_migrations().len())
}

/// Highest migration version shipped with this build.
pub fn latest_version() -> i64 {
    embedded::migrations::runner()
        .get_migrations()
        .iter()
        .map(|m| i64::from(m.version()))
        .max()
        .unwrap_or(0)
}
