// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token sources for replay requests.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use suvidha_config::model::BackendConfig;
use suvidha_core::TokenSource;
use tracing::debug;

/// A fixed token taken from configuration.
pub struct StaticToken {
    token: Option<SecretString>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
        }
    }

    /// A source that never has a token.
    pub fn none() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Option<SecretString> {
        self.token.clone()
    }
}

/// Reads the token from a file on every call, off the async worker threads.
///
/// The kiosk session rewrites this file when the user signs in or the token
/// is refreshed. A missing, unreadable, or blank file means "no token".
pub struct FileTokenSource {
    path: PathBuf,
}

impl FileTokenSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenSource for FileTokenSource {
    async fn access_token(&self) -> Option<SecretString> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    debug!(path = %self.path.display(), "token file is empty");
                    None
                } else {
                    Some(SecretString::from(token.to_string()))
                }
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "token file unreadable");
                None
            }
        }
    }
}

/// Pick the token source described by `[backend]`.
///
/// `token_file` wins over `access_token`. With neither set, requests carry no
/// Authorization header.
pub fn token_source_from_config(config: &BackendConfig) -> Arc<dyn TokenSource> {
    if let Some(path) = &config.token_file {
        Arc::new(FileTokenSource::new(path))
    } else if let Some(token) = &config.access_token {
        Arc::new(StaticToken::new(token.clone()))
    } else {
        Arc::new(StaticToken::none())
    }
}
