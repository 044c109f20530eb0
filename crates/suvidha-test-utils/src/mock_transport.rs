// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock replay transport for deterministic sync tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use suvidha_core::{ReplayTransport, SuvidhaError};
use tokio::sync::Mutex;

/// One scripted outcome for a replay call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// 2xx with this parsed body.
    Success(Value),
    /// Non-2xx with this status and body.
    Status(u16, String),
    /// Network failure with this message.
    Unreachable(String),
}

impl ScriptedReply {
    fn into_result(self) -> Result<Value, SuvidhaError> {
        match self {
            ScriptedReply::Success(body) => Ok(body),
            ScriptedReply::Status(status, body) => Err(SuvidhaError::SyncApplication { status, body }),
            ScriptedReply::Unreachable(message) => Err(SuvidhaError::SyncTransport {
                message,
                source: None,
            }),
        }
    }
}

/// A transport that pops replies from a FIFO script and records every payload.
///
/// When the script is empty every call succeeds with `{"ok": true}`.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    calls: Arc<Mutex<Vec<Value>>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<ScriptedReply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(replies))),
            ..Self::default()
        }
    }

    /// Sleep this long inside every call, to widen interleavings.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_reply(&self, reply: ScriptedReply) {
        self.script.lock().await.push_back(reply);
    }

    /// Payloads received so far, in call order.
    pub async fn calls(&self) -> Vec<Value> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl ReplayTransport for MockTransport {
    async fn replay(&self, payload: &Value) -> Result<Value, SuvidhaError> {
        self.calls.lock().await.push(payload.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Success(json!({"ok": true})));
        reply.into_result()
    }
}
