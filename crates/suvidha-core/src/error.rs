// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Suvidha offline sync engine.

use thiserror::Error;

/// The primary error type used across the storage, sync, and CLI crates.
#[derive(Debug, Error)]
pub enum SuvidhaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The durable store cannot be opened, migrated, read, or written.
    ///
    /// Fatal to all offline functionality. Never retried internally.
    #[error("storage unavailable: {source}")]
    StorageUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Network failure while replaying a transaction against the backend.
    #[error("sync transport error: {message}")]
    SyncTransport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered a replay with a non-success status.
    #[error("backend returned {status}: {body}")]
    SyncApplication { status: u16, body: String },

    /// A record supplied by a caller is missing required fields.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The connectivity detector already has a live reconnect subscription.
    #[error("connectivity detector already has a reconnect subscriber")]
    AlreadySubscribed,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SuvidhaError {
    /// Wraps any error as [`SuvidhaError::StorageUnavailable`].
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SuvidhaError::StorageUnavailable {
            source: Box::new(err),
        }
    }

    /// True for the per-transaction replay errors that are recorded on the
    /// transaction instead of being propagated.
    pub fn is_replay_error(&self) -> bool {
        matches!(
            self,
            SuvidhaError::SyncTransport { .. } | SuvidhaError::SyncApplication { .. }
        )
    }

    /// Text recorded as a failed transaction's `error`.
    ///
    /// A rejection keeps the backend's response body verbatim.
    pub fn recorded_text(&self) -> String {
        match self {
            SuvidhaError::SyncApplication { body, .. } => body.clone(),
            SuvidhaError::SyncTransport { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
