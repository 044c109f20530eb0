// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./suvidha.toml` > `~/.config/suvidha/suvidha.toml` > `/etc/suvidha/suvidha.toml`
//! with environment variable overrides via `SUVIDHA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SuvidhaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/suvidha/suvidha.toml` (system-wide)
/// 3. `~/.config/suvidha/suvidha.toml` (user XDG config)
/// 4. `./suvidha.toml` (local directory)
/// 5. `SUVIDHA_*` environment variables
pub fn load_config() -> Result<SuvidhaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SuvidhaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SuvidhaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SuvidhaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SuvidhaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SuvidhaConfig::default()))
        .merge(Toml::file("/etc/suvidha/suvidha.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("suvidha/suvidha.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("suvidha.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")`: `SUVIDHA_BACKEND_BASE_URL` must map
/// to `backend.base_url`, not `backend.base.url`.
fn env_provider() -> Env {
    Env::prefixed("SUVIDHA_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a prefix-stripped env var name to its dotted config key.
///
/// Figment hands `map` the name before lowercasing it, so case is folded here.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["kiosk", "storage", "backend", "sync", "connectivity"];
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_only_at_section() {
        assert_eq!(map_env_key("backend_base_url"), "backend.base_url");
        assert_eq!(map_env_key("sync_lease_timeout_secs"), "sync.lease_timeout_secs");
        assert_eq!(map_env_key("connectivity_probe_address"), "connectivity.probe_address");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
    }

    #[test]
    fn uppercase_env_keys_are_folded() {
        assert_eq!(map_env_key("BACKEND_BASE_URL"), "backend.base_url");
        assert_eq!(map_env_key("Sync_Max_Attempts"), "sync.max_attempts");
    }

    #[test]
    fn unknown_env_section_is_left_alone() {
        assert_eq!(map_env_key("unrelated_thing"), "unrelated_thing");
    }

    #[test]
    fn env_provider_overrides_every_section() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("kiosk.toml", "[kiosk]\nname = \"from-file\"\n")?;
            jail.set_env("SUVIDHA_KIOSK_NAME", "from-env");
            jail.set_env("SUVIDHA_STORAGE_RETENTION_DAYS", "21");
            jail.set_env("SUVIDHA_BACKEND_PAYMENT_PATH", "/api/v2/pay");
            jail.set_env("SUVIDHA_SYNC_AUTO_REQUEUE", "true");
            jail.set_env("SUVIDHA_CONNECTIVITY_PROBE_ADDRESS", "10.0.0.5:443");

            let config = load_config_from_path(Path::new("kiosk.toml"))?;
            assert_eq!(config.kiosk.name, "from-env");
            assert_eq!(config.storage.retention_days, 21);
            assert_eq!(config.backend.payment_path, "/api/v2/pay");
            assert!(config.sync.auto_requeue);
            assert_eq!(config.connectivity.probe_address.as_deref(), Some("10.0.0.5:443"));
            Ok(())
        });
    }
}
