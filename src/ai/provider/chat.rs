//! Chat Completions Transport
//!
//! Both backends speak the same OpenAI-style chat-completions protocol:
//! bearer auth, `{model, messages, max_tokens, temperature, stream}` request,
//! `{choices, usage, model}` response. Provider-specific field names stop here.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{ChatMessage, GenerationParams, LlmResponse, ProviderKind, ResponseMetadata, TokenUsage};
use crate::config::ProviderSettings;
use crate::constants::{network, providers::CHAT_COMPLETIONS_PATH};
use crate::types::{NovelError, Result};

/// HTTP client for one provider's chat-completions endpoint
pub struct ChatCompletionsClient {
    kind: ProviderKind,
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_url: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("kind", &self.kind)
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ChatCompletionsClient {
    pub fn new(kind: ProviderKind, settings: &ProviderSettings, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS).min(timeout))
            .build()
            .map_err(|e| NovelError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            kind,
            api_key: SecretString::from(settings.api_key.trim().to_string()),
            api_url: settings.api_url.trim().to_string(),
            model: settings.model.trim().to_string(),
            timeout,
            client,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `{api_url}/chat/completions`
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), CHAT_COMPLETIONS_PATH)
    }

    /// Key, endpoint and model are all non-empty
    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.api_url.is_empty() && !self.model.is_empty()
    }

    /// Send one non-streaming completion request.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<LlmResponse> {
        info!(
            "Generating with {} (model: {}, temperature: {}, max_tokens: {})",
            self.kind.display_name(),
            self.model,
            params.temperature,
            params.max_tokens
        );

        let start_time = Instant::now();
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream: false,
        };

        debug!("Sending request to {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} API returned {}", self.kind.display_name(), status);
            return Err(NovelError::provider(
                self.kind.as_str(),
                upstream_message(status, &body),
            ));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            NovelError::provider(self.kind.as_str(), format!("invalid response body: {}", e))
        })?;

        let elapsed = start_time.elapsed();
        let choice = body.choices.into_iter().next().ok_or_else(|| {
            NovelError::provider(
                self.kind.as_str(),
                format!("No response from {} API", self.kind.display_name()),
            )
        })?;

        let usage = body.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        debug!(
            "{} responded in {}ms ({} total tokens)",
            self.kind.display_name(),
            elapsed.as_millis(),
            usage.map(|u| u.total_tokens).unwrap_or(0)
        );

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
            metadata: ResponseMetadata {
                model: body.model,
                finish_reason: choice.finish_reason,
            },
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> NovelError {
        if err.is_timeout() {
            NovelError::timeout(self.kind.as_str(), self.timeout)
        } else {
            NovelError::provider(self.kind.as_str(), format!("request failed: {}", err))
        }
    }
}

/// Prefer the provider's own `error.message`, fall back to status and body.
fn upstream_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, body)
            }
        })
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    /// Captured request: (authorization header, JSON body)
    pub(crate) type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    /// Serve `reply` on `/chat/completions` from an ephemeral local port.
    pub(crate) async fn stub_server(
        status: StatusCode,
        reply: Value,
        delay: Duration,
    ) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let captured = Arc::clone(&seen);

        let app = Router::new().route(
            "/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let reply = reply.clone();
                let captured = Arc::clone(&captured);
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    captured.lock().unwrap().push((auth, body));
                    tokio::time::sleep(delay).await;
                    (status, Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), seen)
    }

    pub(crate) fn settings(api_url: &str) -> ProviderSettings {
        ProviderSettings {
            api_key: "sk-test".into(),
            api_url: api_url.into(),
            model: "test-model".into(),
        }
    }

    fn completion(content: &str) -> Value {
        json!({
            "id": "cmpl-1",
            "model": "test-model-0613",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        })
    }

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are an editor."),
            ChatMessage::user("Fix this."),
        ]
    }

    fn params() -> GenerationParams {
        GenerationParams {
            temperature: 0.3,
            max_tokens: 1000,
        }
    }

    #[tokio::test]
    async fn test_complete_normalizes_response() {
        let (url, seen) = stub_server(StatusCode::OK, completion("Fixed."), Duration::ZERO).await;
        let client =
            ChatCompletionsClient::new(ProviderKind::Deepseek, &settings(&url), Duration::from_secs(5))
                .unwrap();

        let response = client.complete(&messages(), params()).await.unwrap();

        assert_eq!(response.content, "Fixed.");
        assert_eq!(
            response.usage,
            Some(TokenUsage {
                prompt_tokens: 12,
                completion_tokens: 8,
                total_tokens: 20
            })
        );
        assert_eq!(response.metadata.model.as_deref(), Some("test-model-0613"));
        assert_eq!(response.metadata.finish_reason.as_deref(), Some("stop"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth, "Bearer sk-test");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Fix this.");
    }

    #[tokio::test]
    async fn test_error_status_carries_upstream_message() {
        let reply = json!({"error": {"message": "Insufficient Balance", "type": "billing"}});
        let (url, _) = stub_server(StatusCode::PAYMENT_REQUIRED, reply, Duration::ZERO).await;
        let client =
            ChatCompletionsClient::new(ProviderKind::Deepseek, &settings(&url), Duration::from_secs(5))
                .unwrap();

        let err = client.complete(&messages(), params()).await.unwrap_err();
        assert_eq!(err.to_string(), "deepseek API error: Insufficient Balance");
    }

    #[tokio::test]
    async fn test_zero_choices_is_provider_error() {
        let (url, _) = stub_server(StatusCode::OK, json!({"choices": []}), Duration::ZERO).await;
        let client =
            ChatCompletionsClient::new(ProviderKind::Doubao, &settings(&url), Duration::from_secs(5))
                .unwrap();

        let err = client.complete(&messages(), params()).await.unwrap_err();
        assert!(matches!(err, NovelError::Provider { ref provider, .. } if provider == "doubao"));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let (url, _) =
            stub_server(StatusCode::OK, completion("late"), Duration::from_secs(3)).await;
        let client =
            ChatCompletionsClient::new(ProviderKind::Deepseek, &settings(&url), Duration::from_secs(1))
                .unwrap();

        let err = client.complete(&messages(), params()).await.unwrap_err();
        assert_eq!(err.kind(), crate::types::ErrorKind::ProviderError);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_upstream_message_fallbacks() {
        assert_eq!(
            upstream_message(reqwest::StatusCode::BAD_GATEWAY, ""),
            "HTTP 502 Bad Gateway"
        );
        assert_eq!(
            upstream_message(reqwest::StatusCode::BAD_REQUEST, "oops"),
            "HTTP 400 Bad Request: oops"
        );
    }

    #[test]
    fn test_endpoint_and_configuration() {
        let client = ChatCompletionsClient::new(
            ProviderKind::Doubao,
            &settings("https://ark.example.com/api/v3/"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "https://ark.example.com/api/v3/chat/completions");
        assert!(client.is_configured());
        assert!(!format!("{:?}", client).contains("sk-test"));

        let mut incomplete = settings("https://ark.example.com");
        incomplete.model = "  ".into();
        let client =
            ChatCompletionsClient::new(ProviderKind::Doubao, &incomplete, Duration::from_secs(5))
                .unwrap();
        assert!(!client.is_configured());
    }
}
