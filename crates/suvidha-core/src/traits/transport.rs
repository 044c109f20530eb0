// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound replay of queued transactions.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SuvidhaError;

/// Delivers one queued payload to the backend.
///
/// Implementations issue exactly one request per call and do not retry;
/// retry policy belongs to the transaction queue.
#[async_trait]
pub trait ReplayTransport: Send + Sync + 'static {
    /// Replays `payload` verbatim.
    ///
    /// Returns the backend's parsed response on success. Failures must be
    /// [`SuvidhaError::SyncTransport`] or [`SuvidhaError::SyncApplication`].
    async fn replay(&self, payload: &Value) -> Result<Value, SuvidhaError>;
}
