// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP replay of queued transactions against the bill-payment endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde_json::Value;
use suvidha_config::model::BackendConfig;
use suvidha_core::{ReplayTransport, SuvidhaError, TokenSource};
use tracing::debug;

/// Replays each payload with one `POST {base_url}{payment_path}`.
///
/// The bearer token is fetched from the [`TokenSource`] for every request.
/// There is no retry here: a failed request is reported to the orchestrator,
/// which records it on the transaction.
#[derive(Clone)]
pub struct HttpReplayTransport {
    client: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn TokenSource>,
}

impl HttpReplayTransport {
    pub fn new(config: &BackendConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, SuvidhaError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SuvidhaError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.base_url, config.payment_path),
            tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReplayTransport for HttpReplayTransport {
    async fn replay(&self, payload: &Value) -> Result<Value, SuvidhaError> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        if let Some(token) = self.tokens.access_token().await {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| SuvidhaError::SyncTransport {
            message: format!("POST {} failed: {e}", self.endpoint),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SuvidhaError::SyncTransport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(status = %status, bytes = body.len(), "replay response received");

        if !status.is_success() {
            return Err(SuvidhaError::SyncApplication {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| SuvidhaError::SyncTransport {
            message: format!("backend returned {status} with an unparsable body: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::StaticToken;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer, tokens: Arc<dyn TokenSource>) -> HttpReplayTransport {
        let config = BackendConfig {
            base_url: server.uri(),
            request_timeout_secs: 5,
            ..BackendConfig::default()
        };
        HttpReplayTransport::new(&config, tokens).unwrap()
    }

    #[tokio::test]
    async fn posts_payload_verbatim_with_bearer_token() {
        let server = MockServer::start().await;
        let payload = json!({"bill_id": 42, "amount": 500, "payment_method": "upi"});

        Mock::given(method("POST"))
            .and(path("/api/v1/bills/pay"))
            .and(header("authorization", "Bearer kiosk-token"))
            .and(header("content-type", "application/json"))
            .and(body_json(&payload))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"transaction_id": "TXN001"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server, Arc::new(StaticToken::new("kiosk-token")));
        let response = transport.replay(&payload).await.unwrap();
        assert_eq!(response, json!({"transaction_id": "TXN001"}));
    }

    #[tokio::test]
    async fn non_success_status_is_application_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;

        let transport = transport_for(&server, Arc::new(StaticToken::new("stale")));
        let err = transport.replay(&json!({})).await.unwrap_err();
        match err {
            SuvidhaError::SyncApplication { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "token expired");
            }
            other => panic!("expected SyncApplication, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let transport = transport_for(&server, Arc::new(StaticToken::none()));
        assert_eq!(transport.replay(&json!({"n": 1})).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn unparsable_success_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let transport = transport_for(&server, Arc::new(StaticToken::none()));
        let err = transport.replay(&json!({})).await.unwrap_err();
        assert!(matches!(err, SuvidhaError::SyncTransport { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn missing_token_sends_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let transport = transport_for(&server, Arc::new(StaticToken::none()));
        transport.replay(&json!({})).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Bind and drop a listener so the port is closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = BackendConfig {
            base_url: format!("http://{addr}"),
            request_timeout_secs: 2,
            ..BackendConfig::default()
        };
        let transport = HttpReplayTransport::new(&config, Arc::new(StaticToken::none())).unwrap();
        let err = transport.replay(&json!({})).await.unwrap_err();
        assert!(matches!(err, SuvidhaError::SyncTransport { .. }), "got: {err}");
    }
}
