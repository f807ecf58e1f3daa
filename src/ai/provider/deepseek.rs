//! DeepSeek Provider
//!
//! DeepSeek chat API (`deepseek-chat` by default).

use async_trait::async_trait;
use std::time::Duration;

use super::{ChatCompletionsClient, ChatMessage, GenerationParams, LlmProvider, LlmResponse, ProviderKind};
use crate::config::ProviderSettings;
use crate::types::Result;

#[derive(Debug)]
pub struct DeepSeekProvider {
    client: ChatCompletionsClient,
}

impl DeepSeekProvider {
    pub fn new(settings: &ProviderSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatCompletionsClient::new(ProviderKind::Deepseek, settings, timeout)?,
        })
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<LlmResponse> {
        self.client.complete(messages, params).await
    }

    fn is_available(&self) -> bool {
        self.client.is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::chat::tests::{settings, stub_server};
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_unavailable_without_key() {
        let mut config = settings("https://api.deepseek.com");
        config.api_key = String::new();
        let provider = DeepSeekProvider::new(&config, Duration::from_secs(5)).unwrap();
        assert!(!provider.is_available());
    }

    #[tokio::test]
    async fn test_generate_through_chat_endpoint() {
        let reply = json!({
            "model": "deepseek-chat",
            "choices": [{"message": {"content": "Polished."}, "finish_reason": "stop"}]
        });
        let (url, seen) = stub_server(StatusCode::OK, reply, Duration::ZERO).await;
        let provider = DeepSeekProvider::new(&settings(&url), Duration::from_secs(5)).unwrap();

        assert!(provider.is_available());
        let response = provider
            .generate(&[ChatMessage::user("Hi")], GenerationParams::default())
            .await
            .unwrap();

        assert_eq!(response.content, "Polished.");
        assert!(response.usage.is_none());
        assert_eq!(seen.lock().unwrap()[0].1["temperature"], json!(0.7));
    }
}
