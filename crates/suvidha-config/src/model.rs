// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Suvidha kiosk sync engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Suvidha configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SuvidhaConfig {
    /// Kiosk identity and logging.
    #[serde(default)]
    pub kiosk: KioskConfig,

    /// Durable store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Backend endpoint and credentials used for replay.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Sync cycle and retry policy.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Reachability probing for the long-running service.
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

/// Kiosk identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KioskConfig {
    /// Display name of this kiosk, used in log output.
    #[serde(default = "default_kiosk_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            name: default_kiosk_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_kiosk_name() -> String {
    "suvidha-kiosk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Synced transactions older than this many days are pruned after each cycle.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("suvidha").join("suvidha-offline.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "suvidha-offline.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

fn default_retention_days() -> u32 {
    7
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Scheme, host, and port of the citizen-services API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the bill-payment endpoint queued payloads are replayed against.
    #[serde(default = "default_payment_path")]
    pub payment_path: String,

    /// Fixed bearer token. Ignored when `token_file` is set.
    #[serde(default)]
    pub access_token: Option<String>,

    /// File the kiosk session writes its current access token to.
    /// Re-read on every replay request.
    #[serde(default)]
    pub token_file: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            payment_path: default_payment_path(),
            access_token: None,
            token_file: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_payment_path() -> String {
    "/api/v1/bills/pay".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Sync cycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Failed transactions with fewer attempts than this may be requeued.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Requeue eligible failed transactions at the start of every cycle.
    #[serde(default)]
    pub auto_requeue: bool,

    /// How long a cycle may hold a claimed transaction before another
    /// cycle is allowed to reclaim it.
    #[serde(default = "default_lease_timeout_secs")]
    pub lease_timeout_secs: u64,

    /// Run one cycle when the service starts and the kiosk is already online.
    #[serde(default = "default_sync_on_startup")]
    pub sync_on_startup: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            auto_requeue: false,
            lease_timeout_secs: default_lease_timeout_secs(),
            sync_on_startup: default_sync_on_startup(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_lease_timeout_secs() -> u64 {
    300
}

fn default_sync_on_startup() -> bool {
    true
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectivityConfig {
    /// `host:port` to open a TCP connection to. Defaults to the backend's host.
    #[serde(default)]
    pub probe_address: Option<String>,

    /// Seconds between probes.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,

    /// Connect timeout for a single probe, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Reachability assumed before the first probe completes.
    #[serde(default)]
    pub assume_online: bool,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_address: None,
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
            assume_online: false,
        }
    }
}

fn default_probe_interval_secs() -> u64 {
    15
}

fn default_probe_timeout_ms() -> u64 {
    2000
}
