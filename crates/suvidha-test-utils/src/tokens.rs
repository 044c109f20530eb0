// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Swappable token source, standing in for the kiosk session.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use secrecy::SecretString;
use suvidha_core::TokenSource;

#[derive(Clone, Default)]
pub struct StaticTokens {
    current: Arc<RwLock<Option<String>>>,
}

impl StaticTokens {
    pub fn new(token: &str) -> Self {
        let tokens = Self::default();
        tokens.set(Some(token));
        tokens
    }

    /// Replace the token seen by the next request. `None` signs the session out.
    pub fn set(&self, token: Option<&str>) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = token.map(str::to_string);
    }
}

#[async_trait]
impl TokenSource for StaticTokens {
    async fn access_token(&self) -> Option<SecretString> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        current.clone().map(SecretString::from)
    }
}
