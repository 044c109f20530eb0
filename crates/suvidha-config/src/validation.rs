// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL shape, non-empty paths, and positive intervals.

use crate::diagnostic::ConfigError;
use crate::model::SuvidhaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SuvidhaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let base_url = config.backend.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("backend.base_url `{base_url}` must start with http:// or https://"),
        });
    } else if base_url.ends_with('/') {
        errors.push(ConfigError::Validation {
            message: format!("backend.base_url `{base_url}` must not end with `/`"),
        });
    }

    if !config.backend.payment_path.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!(
                "backend.payment_path `{}` must start with `/`",
                config.backend.payment_path
            ),
        });
    }

    if config.backend.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "backend.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if let Some(path) = &config.backend.token_file
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "backend.token_file must not be empty when set".to_string(),
        });
    }

    if config.sync.max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "sync.max_attempts must be at least 1, got {}",
                config.sync.max_attempts
            ),
        });
    }

    if config.sync.lease_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.lease_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.connectivity.probe_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "connectivity.probe_interval_secs must be at least 1".to_string(),
        });
    }

    if config.connectivity.probe_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "connectivity.probe_timeout_ms must be at least 1".to_string(),
        });
    }

    if let Some(addr) = &config.connectivity.probe_address
        && !addr.contains(':')
    {
        errors.push(ConfigError::Validation {
            message: format!("connectivity.probe_address `{addr}` must be `host:port`"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
