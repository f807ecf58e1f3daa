//! AI Integration Layer
//!
//! Editing operations on top of chat-completion providers: provider
//! adapters, prompt construction and the orchestrator that ties them to
//! stored chapters.

pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod results;
pub mod timeout;

pub use orchestrator::{AiOrchestrator, ChapterSource};
pub use prompt::{Prompt, PromptBuilder, PromptSection};
pub use provider::{
    ChatMessage, DeepSeekProvider, DoubaoProvider, GenerationParams, LlmProvider, LlmResponse,
    ProviderDescriptor, ProviderKind, ProviderRegistry, ResponseMetadata, Role, SharedProvider,
    TokenUsage,
};
pub use results::{
    AnalysisFacets, AnalysisResult, BatchFailure, BatchItem, BatchPolishResult,
    ChapterPolishResult, PolishResult, RewriteResult, SuggestionResult,
};
pub use timeout::with_timeout;
