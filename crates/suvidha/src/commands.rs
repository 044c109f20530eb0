// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot CLI commands over the offline store.
//!
//! Every command prints JSON on stdout. Logs go to stderr.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use suvidha_config::SuvidhaConfig;
use suvidha_core::{HealthStatus, Reachability, SuvidhaError};
use suvidha_storage::{BillCache, Database, TransactionRepository};
use suvidha_sync::{
    token_source_from_config, ConnectivityDetector, HttpReplayTransport, ReachabilityProbe,
    SyncOrchestrator, SyncSettings,
};
use tracing::info;

use crate::{BillsAction, Commands};

pub async fn run(command: Commands, config: &SuvidhaConfig) -> Result<(), SuvidhaError> {
    let db = Database::from_config(&config.storage).await?;
    let result = dispatch(command, config, &db).await;
    db.close().await?;
    result
}

async fn dispatch(command: Commands, config: &SuvidhaConfig, db: &Database) -> Result<(), SuvidhaError> {
    let repo = TransactionRepository::new(db.clone());
    match command {
        Commands::Enqueue { payload, file } => {
            let payload = read_payload(payload.as_deref(), file.as_deref())?;
            let tx = repo.enqueue(payload).await?;
            print_json(&tx)
        }
        Commands::Pending => print_json(&repo.list_pending().await?),
        Commands::List { status } => match status {
            Some(status) => print_json(&repo.list_by_status(status).await?),
            None => print_json(&repo.list_all().await?),
        },
        Commands::Show { id } => match repo.get(id).await? {
            Some(tx) => print_json(&tx),
            None => Err(SuvidhaError::InvalidRecord(format!("no transaction with id {id}"))),
        },
        Commands::Status => {
            let counts = repo.count_by_status().await?;
            let health = match db.health_check().await {
                HealthStatus::Healthy => "healthy".to_string(),
                HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
            };
            print_json(&json!({
                "kiosk": config.kiosk.name,
                "database_path": config.storage.database_path,
                "schema_version": db.schema_version().await?,
                "health": health,
                "transactions": counts,
                "total": counts.total(),
            }))
        }
        Commands::Sync { assume_online } => {
            let reachability = if assume_online || config.connectivity.assume_online {
                Reachability::Online
            } else {
                ReachabilityProbe::from_config(&config.connectivity, &config.backend)?
                    .probe_once()
                    .await
            };
            let detector = ConnectivityDetector::new(reachability);
            let transport =
                HttpReplayTransport::new(&config.backend, token_source_from_config(&config.backend))?;
            let orchestrator = SyncOrchestrator::new(
                repo,
                Arc::new(transport),
                detector,
                SyncSettings::from(&config.sync),
            );
            let outcome = orchestrator.run_cycle().await?;
            print_json(&json!({
                "reachability": reachability,
                "synced": outcome.synced,
                "failed": outcome.failed,
                "skipped": outcome.skipped,
            }))
        }
        Commands::Requeue { max_attempts } => {
            let max_attempts = max_attempts.unwrap_or(config.sync.max_attempts);
            let requeued = repo.requeue_failed(max_attempts).await?;
            print_json(&json!({ "requeued": requeued, "max_attempts": max_attempts }))
        }
        Commands::Cleanup { days } => {
            let days = days.unwrap_or(config.storage.retention_days);
            let deleted = repo.cleanup(days).await?;
            print_json(&json!({ "deleted": deleted, "days_old": days }))
        }
        Commands::Bills { action } => bills(action, BillCache::new(db.clone())).await,
        Commands::Serve => Err(SuvidhaError::Internal(
            "serve is not a one-shot command".to_string(),
        )),
    }
}

async fn bills(action: BillsAction, cache: BillCache) -> Result<(), SuvidhaError> {
    match action {
        BillsAction::List { user } => {
            let bills = match user {
                Some(user) => cache.list_for_user(&user).await?,
                None => cache.get_all().await?,
            };
            print_json(&bills)
        }
        BillsAction::Get { id } => match cache.get(&id).await? {
            Some(bill) => print_json(&bill),
            None => Err(SuvidhaError::InvalidRecord(format!("no cached bill with id {id}"))),
        },
        BillsAction::Cache { file } => {
            let records = match read_json_file(&file)? {
                Value::Array(records) => records,
                single @ Value::Object(_) => vec![single],
                _ => {
                    return Err(SuvidhaError::InvalidRecord(format!(
                        "{} must hold a bill object or an array of bills",
                        file.display()
                    )));
                }
            };
            let cached = cache.cache_records(records).await?;
            info!(cached, "bill cache refreshed");
            print_json(&json!({ "cached": cached }))
        }
        BillsAction::Clear => {
            let removed = cache.clear().await?;
            print_json(&json!({ "removed": removed }))
        }
    }
}

fn read_payload(inline: Option<&str>, file: Option<&Path>) -> Result<Value, SuvidhaError> {
    match (inline, file) {
        (Some(raw), _) => serde_json::from_str(raw)
            .map_err(|e| SuvidhaError::InvalidRecord(format!("payload is not valid JSON: {e}"))),
        (None, Some(path)) => read_json_file(path),
        (None, None) => Err(SuvidhaError::InvalidRecord(
            "provide a JSON payload or --file".to_string(),
        )),
    }
}

fn read_json_file(path: &Path) -> Result<Value, SuvidhaError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| SuvidhaError::InvalidRecord(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| SuvidhaError::InvalidRecord(format!("{} is not valid JSON: {e}", path.display())))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SuvidhaError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| SuvidhaError::Internal(format!("failed to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_payload_must_be_json() {
        assert_eq!(
            read_payload(Some(r#"{"bill_id": 1}"#), None).unwrap(),
            json!({"bill_id": 1})
        );
        assert!(matches!(
            read_payload(Some("not json"), None),
            Err(SuvidhaError::InvalidRecord(_))
        ));
        assert!(read_payload(None, None).is_err());
    }

    #[test]
    fn payload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payment.json");
        std::fs::write(&path, r#"{"bill_id": 42, "amount": 500}"#).unwrap();
        assert_eq!(
            read_payload(None, Some(&path)).unwrap(),
            json!({"bill_id": 42, "amount": 500})
        );
    }
}
