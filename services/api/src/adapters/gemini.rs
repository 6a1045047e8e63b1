//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for the Gemini syllabus-extraction model.
//! It implements the `SyllabusModel` port from the `core` crate over plain
//! HTTP: one `generateContent` call per ingestion, no streaming, no retries.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use syllabus_core::ports::{GatewayError, SyllabusModel};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SyllabusModel` against the Gemini REST API.
#[derive(Clone)]
pub struct GeminiGateway {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiGateway {
    /// Creates a new `GeminiGateway`. The `reqwest::Client` carries the
    /// request timeout; the base URL is injectable so tests can target a
    /// local mock server.
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        model: String,
        base_url: String,
    ) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

//=========================================================================================
// `SyllabusModel` Trait Implementation
//=========================================================================================

#[async_trait]
impl SyllabusModel for GeminiGateway {
    /// Sends one prompt and returns the raw model text, before any
    /// sanitizing. The low temperature keeps extraction output stable.
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GatewayError::Configuration("GEMINI_API_KEY is not set".to_string())
        })?;

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.2,
                "maxOutputTokens": 8192
            }
        });

        // The key travels in a header, not the query string, so request URLs
        // in transport errors and logs never carry the credential.
        debug!(model = %self.model, "sending generateContent request");
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Credential(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedEnvelope(e.to_string()))?;

        envelope
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                GatewayError::MalformedEnvelope(
                    "response has no candidates[0].content.parts[0].text".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> GeminiGateway {
        GeminiGateway::new(
            reqwest::Client::new(),
            Some("test-key".to_string()),
            "gemini-2.5-flash".to_string(),
            server.uri(),
        )
    }

    fn envelope(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
    }

    #[tokio::test]
    async fn returns_the_first_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope("{\"course\":{}}")))
            .expect(1)
            .mount(&server)
            .await;

        let text = gateway(&server).generate("extract this").await.unwrap();
        assert_eq!(text, "{\"course\":{}}");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let server = MockServer::start().await;
        // No mock mounted: a request would 404 and surface as Service.
        let gw = GeminiGateway::new(
            reqwest::Client::new(),
            None,
            "gemini-2.5-flash".to_string(),
            server.uri(),
        );

        let err = gw.generate("extract this").await.unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[tokio::test]
    async fn forbidden_maps_to_credential_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("key revoked"))
            .mount(&server)
            .await;

        let err = gateway(&server).generate("extract this").await.unwrap_err();
        match err {
            GatewayError::Credential(body) => assert_eq!(body, "key revoked"),
            other => panic!("expected Credential, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_failures_map_to_service_error_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = gateway(&server).generate("extract this").await.unwrap_err();
        match err {
            GatewayError::Service { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected Service, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn envelope_without_text_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).generate("extract this").await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedEnvelope(_)));
    }

    #[tokio::test]
    async fn transport_errors_never_carry_the_api_key() {
        // Nothing listens on the discard port; the send fails outright.
        let gw = GeminiGateway::new(
            reqwest::Client::new(),
            Some("secret-key".to_string()),
            "gemini-2.5-flash".to_string(),
            "http://127.0.0.1:9".to_string(),
        );

        let err = gw.generate("extract this").await.unwrap_err();
        match err {
            GatewayError::Transport(message) => assert!(!message.contains("secret-key")),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_responses_map_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope("late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let gw = GeminiGateway::new(
            http,
            Some("test-key".to_string()),
            "gemini-2.5-flash".to_string(),
            server.uri(),
        );

        let err = gw.generate("extract this").await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout));
    }
}
