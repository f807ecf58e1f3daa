//! Doubao Provider
//!
//! Volcano Engine Ark API. Models are addressed by endpoint id (`ep-...`),
//! so there is no default model and the provider stays unavailable until one
//! is configured.

use async_trait::async_trait;
use std::time::Duration;

use super::{ChatCompletionsClient, ChatMessage, GenerationParams, LlmProvider, LlmResponse, ProviderKind};
use crate::config::ProviderSettings;
use crate::types::Result;

#[derive(Debug)]
pub struct DoubaoProvider {
    client: ChatCompletionsClient,
}

impl DoubaoProvider {
    pub fn new(settings: &ProviderSettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ChatCompletionsClient::new(ProviderKind::Doubao, settings, timeout)?,
        })
    }
}

#[async_trait]
impl LlmProvider for DoubaoProvider {
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
