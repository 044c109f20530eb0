// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access to the kiosk session's current bearer token.

use async_trait::async_trait;
use secrecy::SecretString;

/// Supplies the access token at the moment a request is made.
///
/// The sync engine never caches, refreshes, or validates the token.
#[async_trait]
pub trait TokenSource: Send + Sync + 'static {
    /// Returns the currently valid access token, if the session has one.
    async fn access_token(&self) -> Option<SecretString>;
}
