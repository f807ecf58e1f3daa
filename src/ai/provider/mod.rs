//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait every text-generation backend implements.
//! All providers return `LlmResponse` with token usage when the backend reports it.
//!
//! ## Modules
//!
//! - `chat`: shared chat-completions transport (bearer auth, JSON body)
//! - `deepseek`, `doubao`: the two concrete backends

mod chat;
mod deepseek;
mod doubao;

pub use chat::ChatCompletionsClient;
pub use deepseek::DeepSeekProvider;
pub use doubao::DoubaoProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProvidersConfig;
use crate::types::{NovelError, Result};

// =============================================================================
// Provider Kind
// =============================================================================

/// Registered backend, selected by tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Deepseek,
    Doubao,
}

impl ProviderKind {
    pub const ALL: &'static [ProviderKind] = &[ProviderKind::Deepseek, ProviderKind::Doubao];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deepseek => "deepseek",
            Self::Doubao => "doubao",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Deepseek => "DeepSeek",
            Self::Doubao => "Doubao",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = NovelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deepseek" => Ok(Self::Deepseek),
            "doubao" => Ok(Self::Doubao),
            _ => Err(NovelError::UnknownProvider(s.to_string())),
        }
    }
}

// =============================================================================
// Messages and Parameters
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        use crate::constants::generation;
        Self {
            temperature: generation::DEFAULT_TEMPERATURE,
            max_tokens: generation::DEFAULT_MAX_TOKENS,
        }
    }
}

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Provider and model info
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// Model the backend actually used
    pub model: Option<String>,
    pub finish_reason: Option<String>,
}

/// Normalized completion
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// First choice's message content
    pub content: String,
    pub usage: Option<TokenUsage>,
    pub metadata: ResponseMetadata,
}

/// Shared LLM provider type for concurrent access.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Issue exactly one chat-completion request.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<LlmResponse>;

    /// Configuration check only; never touches the network.
    fn is_available(&self) -> bool;
}

// =============================================================================
// Registry
// =============================================================================

/// What callers see when listing providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub display_name: String,
    pub available: bool,
}

/// Explicit provider-kind to adapter mapping, built once at startup
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderKind, SharedProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build both HTTP adapters from configuration.
    ///
    /// Missing credentials do not fail here; the adapter reports itself
    /// unavailable instead.
    pub fn from_config(config: &ProvidersConfig, timeout: Duration) -> Result<Self> {
        let mut registry = Self::new();
        registry.insert(
            ProviderKind::Deepseek,
            Arc::new(DeepSeekProvider::new(&config.deepseek, timeout)?),
        );
        registry.insert(
            ProviderKind::Doubao,
            Arc::new(DoubaoProvider::new(&config.doubao, timeout)?),
        );
        Ok(registry)
    }

    pub fn insert(&mut self, kind: ProviderKind, provider: SharedProvider) {
        self.providers.insert(kind, provider);
    }

    pub fn with(mut self, kind: ProviderKind, provider: SharedProvider) -> Self {
        self.insert(kind, provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&SharedProvider> {
        self.providers.get(&kind)
    }

    pub fn list(&self) -> Vec<ProviderDescriptor> {
        self.providers
            .iter()
            .map(|(kind, provider)| ProviderDescriptor {
                kind: *kind,
                display_name: kind.display_name().to_string(),
                available: provider.is_available(),
            })
            .collect()
    }
}
