// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Suvidha configuration system.

use std::io::Write;

use suvidha_config::diagnostic::ConfigError;
use suvidha_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_suvidha_config() {
    let toml = r#"
[kiosk]
name = "ward-12-kiosk"
log_level = "debug"

[storage]
database_path = "/var/lib/suvidha/offline.db"
wal_mode = false
retention_days = 14

[backend]
base_url = "https://api.suvidha.example"
payment_path = "/api/v1/bills/pay"
token_file = "/run/suvidha/access_token"
request_timeout_secs = 10

[sync]
max_attempts = 5
auto_requeue = true
lease_timeout_secs = 120
sync_on_startup = false

[connectivity]
probe_address = "api.suvidha.example:443"
probe_interval_secs = 5
probe_timeout_ms = 750
assume_online = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.kiosk.name, "ward-12-kiosk");
    assert_eq!(config.kiosk.log_level, "debug");
    assert_eq!(config.storage.database_path, "/var/lib/suvidha/offline.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.retention_days, 14);
    assert_eq!(config.backend.base_url, "https://api.suvidha.example");
    assert_eq!(
        config.backend.token_file.as_deref(),
        Some("/run/suvidha/access_token")
    );
    assert_eq!(config.backend.request_timeout_secs, 10);
    assert_eq!(config.sync.max_attempts, 5);
    assert!(config.sync.auto_requeue);
    assert_eq!(config.sync.lease_timeout_secs, 120);
    assert!(!config.sync.sync_on_startup);
    assert_eq!(
        config.connectivity.probe_address.as_deref(),
        Some("api.suvidha.example:443")
    );
    assert_eq!(config.connectivity.probe_interval_secs, 5);
    assert_eq!(config.connectivity.probe_timeout_ms, 750);
    assert!(config.connectivity.assume_online);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.kiosk.name, "suvidha-kiosk");
    assert_eq!(config.kiosk.log_level, "info");
    assert!(config.storage.wal_mode);
    assert_eq!(config.storage.retention_days, 7);
    assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
    assert_eq!(config.backend.payment_path, "/api/v1/bills/pay");
    assert!(config.backend.access_token.is_none());
    assert!(config.backend.token_file.is_none());
    assert_eq!(config.sync.max_attempts, 3);
    assert!(!config.sync.auto_requeue);
    assert_eq!(config.sync.lease_timeout_secs, 300);
    assert!(config.sync.sync_on_startup);
    assert!(config.connectivity.probe_address.is_none());
    assert!(!config.connectivity.assume_online);
}

/// Unknown field in [backend] section produces an UnknownField error.
#[test]
fn unknown_field_in_backend_produces_error() {
    let toml = r#"
[backend]
bse_url = "https://api.suvidha.example"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bse_url"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown key is converted into a diagnostic with a suggestion.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = r#"
[sync]
max_atempts = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "max_atempts");
            assert_eq!(suggestion.as_deref(), Some("max_attempts"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Wrong value type maps to InvalidType.
#[test]
fn wrong_type_produces_invalid_type_diagnostic() {
    let toml = r#"
[storage]
retention_days = "a week"
"#;

    let errors = load_and_validate_str(toml).expect_err("string is not a u32");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("retention_days"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after successful deserialization.
#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[backend]
base_url = "ftp://files.example"
"#;

    let errors = load_and_validate_str(toml).expect_err("ftp scheme is rejected");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("backend.base_url"))
    ));
}

/// Environment variables override file values using section-aware mapping.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "kiosk.toml",
            r#"
[backend]
base_url = "https://from-file.example"

[sync]
max_attempts = 2
"#,
        )?;
        jail.set_env("SUVIDHA_BACKEND_BASE_URL", "https://from-env.example");
        jail.set_env("SUVIDHA_SYNC_LEASE_TIMEOUT_SECS", "45");

        let config = load_and_validate_path(std::path::Path::new("kiosk.toml"))
            .map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.backend.base_url, "https://from-env.example");
        assert_eq!(config.sync.max_attempts, 2);
        assert_eq!(config.sync.lease_timeout_secs, 45);
        Ok(())
    });
}

/// A config file on disk loads through the path-based entry point.
#[test]
fn load_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[kiosk]\nname = \"ward-3\"\n[storage]\nretention_days = 30").unwrap();

    let config = load_and_validate_path(file.path()).expect("file config should validate");
    assert_eq!(config.kiosk.name, "ward-3");
    assert_eq!(config.storage.retention_days, 30);
}
