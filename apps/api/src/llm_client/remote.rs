//! Remote generative-language client with credential rotation.
//!
//! Every attempt uses `api_keys[cursor % len]`. A retryable failure
//! (403, 429, 500, 503, 504, or a connect/timeout fault) advances the cursor
//! so the next attempt goes out under a different key, then sleeps for an
//! exponential backoff: base, 2×base, 4×base, … capped at `MAX_BACKOFF`.
//! The retry budget is `2 × key count` after the first attempt.
//!
//! Keys are sent as the `key` query parameter and are never logged.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{LlmClient, LlmError};

const MAX_OUTPUT_TOKENS: u32 = 4096;
const TOP_P: f32 = 1.0;
const RESPONSE_MIME_TYPE: &str = "application/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
/// Retries allowed per configured key.
const RETRIES_PER_KEY: usize = 2;
/// Provider error bodies are cut to this many chars before they reach an error.
const MAX_ERROR_BODY_CHARS: usize = 512;

const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::FORBIDDEN,
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Connection settings for `RemoteLlmClient`.
#[derive(Clone)]
pub struct RemoteLlmSettings {
    pub api_keys: Vec<String>,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub retry_base_delay: Duration,
}

impl fmt::Debug for RemoteLlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteLlmSettings")
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if every level is present.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

pub struct RemoteLlmClient {
    http: Client,
    settings: RemoteLlmSettings,
    /// Rotation cursor, shared by every call made through this instance.
    cursor: AtomicUsize,
}

impl RemoteLlmClient {
    pub fn new(settings: RemoteLlmSettings) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            settings,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Current value of the rotation cursor. Only ever increases.
    pub fn rotation_cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn backoff_delay(&self, retry: u32) -> Duration {
        self.settings
            .retry_base_delay
            .saturating_mul(1u32 << retry.min(16))
            .min(MAX_BACKOFF)
    }

    /// One network round trip under a single credential.
    async fn attempt(
        &self,
        api_key: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<String, LlmError> {
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let payload = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            let message: String = payload.chars().take(MAX_ERROR_BODY_CHARS).collect();
            let status_code = Some(status.as_u16());
            return Err(if RETRYABLE_STATUSES.contains(&status) {
                LlmError::Transient {
                    status: status_code,
                    message,
                }
            } else {
                LlmError::Fatal {
                    status: status_code,
                    message,
                }
            });
        }

        serde_json::from_str::<GenerateContentResponse>(&payload)
            .ok()
            .and_then(GenerateContentResponse::into_text)
            .ok_or_else(|| LlmError::Fatal {
                status: Some(status.as_u16()),
                message: "malformed provider response".to_string(),
            })
    }
}

/// Connect failures and timeouts are worth another attempt; anything else
/// reqwest reports (builder, redirect, decode) is not.
fn classify_transport_error(e: reqwest::Error) -> LlmError {
    let transient = e.is_timeout() || e.is_connect();
    let message = e.without_url().to_string();
    if transient {
        LlmError::Transient {
            status: None,
            message,
        }
    } else {
        LlmError::Fatal {
            status: None,
            message,
        }
    }
}

#[async_trait]
impl LlmClient for RemoteLlmClient {
    async fn send(&self, prompt: &str) -> Result<String, LlmError> {
        let keys = &self.settings.api_keys;
        if keys.is_empty() {
            return Err(LlmError::Configuration(
                "no provider API keys configured".to_string(),
            ));
        }

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                top_p: TOP_P,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: RESPONSE_MIME_TYPE,
            },
        };

        let max_retries = keys.len() * RETRIES_PER_KEY;
        let mut retries = 0usize;

        loop {
            let index = self.cursor.load(Ordering::Relaxed) % keys.len();

            match self.attempt(&keys[index], &body).await {
                Ok(text) => {
                    debug!(
                        key_index = index,
                        cursor = self.rotation_cursor(),
                        retries,
                        reply_chars = text.len(),
                        "Provider call succeeded"
                    );
                    return Ok(text);
                }
                Err(err) if err.is_transient() && retries < max_retries => {
                    let next_index =
                        self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1) % keys.len();
                    let delay = self.backoff_delay(retries as u32);
                    retries += 1;
                    warn!(
                        "Provider error ({err}). Rotating to API key #{next_index} and retrying in {}ms... Attempt: {retries}/{max_retries}",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    error!(retries, "Provider call failed: {err}");
                    return Err(err);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-test";
    const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

    fn settings(server: &MockServer, keys: &[&str]) -> RemoteLlmSettings {
        RemoteLlmSettings {
            api_keys: keys.iter().map(|k| k.to_string()).collect(),
            model: MODEL.to_string(),
            temperature: 0.0,
            base_url: server.uri(),
            retry_base_delay: Duration::from_millis(1),
        }
    }

    fn success_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [
                {"content": {"parts": [{"text": text}], "role": "model"}, "finishReason": "STOP"}
            ]
        })
    }

    async fn keys_used(server: &MockServer) -> Vec<String> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| *k == "key")
                    .map(|(_, v)| v.into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_success_extracts_nested_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(query_param("key", "k1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("{\"ok\":true}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemoteLlmClient::new(settings(&server, &["k1"])).unwrap();
        let text = client.send("prompt").await.unwrap();

        assert_eq!(text, "{\"ok\":true}");
        assert_eq!(client.rotation_cursor(), 0);
    }

    #[tokio::test]
    async fn test_request_body_matches_provider_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("{}")))
            .mount(&server)
            .await;

        let client = RemoteLlmClient::new(settings(&server, &["k1"])).unwrap();
        client.send("evaluate this").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "evaluate this");
        assert_eq!(body["generationConfig"]["topP"], 1.0);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["temperature"], 0.0);
    }

    #[tokio::test]
    async fn test_retries_429_then_succeeds_with_rotation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("done")))
            .mount(&server)
            .await;

        let client = RemoteLlmClient::new(settings(&server, &["k1", "k2"])).unwrap();
        let text = client.send("prompt").await.unwrap();

        assert_eq!(text, "done");
        let keys = keys_used(&server).await;
        assert_eq!(keys.len(), 4, "succeeds on the 4th attempt");
        assert_eq!(keys, vec!["k1", "k2", "k1", "k2"]);
        assert_eq!(client.rotation_cursor(), 3);
    }

    #[tokio::test]
    async fn test_bad_request_is_fatal_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemoteLlmClient::new(settings(&server, &["k1", "k2"])).unwrap();
        let err = client.send("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Fatal { status: Some(400), .. }));
        assert_eq!(keys_used(&server).await.len(), 1);
        assert_eq!(client.rotation_cursor(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_last_transient_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = RemoteLlmClient::new(settings(&server, &["only"])).unwrap();
        let err = client.send("prompt").await.unwrap_err();

        match err {
            LlmError::Transient { status, message } => {
                assert_eq!(status, Some(503));
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected transient error, got {other:?}"),
        }
        // One initial attempt plus 2 × 1 key retries.
        assert_eq!(keys_used(&server).await.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_fatal_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemoteLlmClient::new(settings(&server, &["k1", "k2"])).unwrap();
        let err = client.send("prompt").await.unwrap_err();

        match err {
            LlmError::Fatal { message, .. } => assert_eq!(message, "malformed provider response"),
            other => panic!("expected fatal error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_key_list_is_configuration_error() {
        let server = MockServer::start().await;
        let client = RemoteLlmClient::new(settings(&server, &[])).unwrap();

        let err = client.send("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Configuration(_)));
        assert!(keys_used(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_cursor_is_shared_across_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let client = RemoteLlmClient::new(settings(&server, &["k1", "k2", "k3"])).unwrap();
        client.send("first").await.unwrap();
        client.send("second").await.unwrap();

        // The second call starts where the first call's rotation left off.
        assert_eq!(keys_used(&server).await, vec!["k1", "k2", "k2"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_rotations_are_never_lost() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(8)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let client = std::sync::Arc::new(
            RemoteLlmClient::new(settings(&server, &["k1", "k2", "k3", "k4"])).unwrap(),
        );
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move { client.send(&format!("prompt {i}")).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "ok");
        }

        // Exactly one cursor advance per 429 served.
        assert_eq!(client.rotation_cursor(), 8);
    }

    #[tokio::test]
    async fn test_connection_refused_is_retried_as_transient() {
        // Bind then drop a listener so the port is known to be closed.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = RemoteLlmClient::new(RemoteLlmSettings {
            api_keys: vec!["secret-a".to_string(), "secret-b".to_string()],
            model: MODEL.to_string(),
            temperature: 0.0,
            base_url: format!("http://127.0.0.1:{port}"),
            retry_base_delay: Duration::from_millis(1),
        })
        .unwrap();

        let err = client.send("prompt").await.unwrap_err();

        match err {
            LlmError::Transient { status, message } => {
                assert_eq!(status, None);
                assert!(!message.contains("key="));
                assert!(!message.contains("secret-"));
            }
            other => panic!("expected transient error, got {other:?}"),
        }
        // Every retry rotated: 2 × 2 keys.
        assert_eq!(client.rotation_cursor(), 4);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let client = RemoteLlmClient::new(RemoteLlmSettings {
            api_keys: vec!["k".to_string()],
            model: MODEL.to_string(),
            temperature: 0.0,
            base_url: "http://localhost".to_string(),
            retry_base_delay: Duration::from_secs(2),
        })
        .unwrap();

        assert_eq!(client.backoff_delay(0), Duration::from_secs(2));
        assert_eq!(client.backoff_delay(1), Duration::from_secs(4));
        assert_eq!(client.backoff_delay(2), Duration::from_secs(8));
        assert_eq!(client.backoff_delay(10), MAX_BACKOFF);
    }

    #[test]
    fn test_settings_debug_redacts_keys() {
        let settings = RemoteLlmSettings {
            api_keys: vec!["super-secret".to_string()],
            model: MODEL.to_string(),
            temperature: 0.0,
            base_url: "http://localhost".to_string(),
            retry_base_delay: Duration::from_secs(2),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("1 redacted"));
    }
}
