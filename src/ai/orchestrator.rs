//! AI Orchestrator
//!
//! Resolves a provider, renders the prompt, applies the per-operation
//! generation policy and normalizes what comes back.
//!
//! ## Failure model
//!
//! - Single operations (polish, rewrite, suggest) surface errors directly.
//! - `batch_polish` and `analyze` settle every sub-call independently: one
//!   failed call never cancels or fails its siblings.
//! - Provider resolution happens before any network I/O. In aggregates it
//!   happens per item, so an unusable provider settles as item failures.
//! - Nothing is retried.

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::prompt::{Prompt, polish_prompt, rewrite_prompt, suggestion_prompt};
use super::provider::{
    GenerationParams, LlmResponse, ProviderDescriptor, ProviderKind, ProviderRegistry,
    SharedProvider,
};
use super::results::{
    AnalysisFacets, AnalysisResult, BatchPolishResult, ChapterPolishResult, PolishResult,
    RewriteResult, SuggestionResult,
};
use super::timeout::with_timeout;
use crate::config::{AiConfig, Config, OperationDefaults};
use crate::storage::ChapterStore;
use crate::types::{
    AnalyzeRequest, ChapterContent, NovelError, PolishOptions, PolishRequest, Result,
    RewriteRequest, SuggestionKind, SuggestionRequest,
};

/// Where chapter text comes from; the implementation enforces ownership.
pub trait ChapterSource: Send + Sync {
    fn chapter_content(&self, chapter_id: &str, caller_id: &str) -> Result<ChapterContent>;
}

impl ChapterSource for ChapterStore {
    fn chapter_content(&self, chapter_id: &str, caller_id: &str) -> Result<ChapterContent> {
        self.get_chapter_content(chapter_id, caller_id)
    }
}

pub struct AiOrchestrator {
    registry: ProviderRegistry,
    defaults: OperationDefaults,
    request_timeout: Duration,
    max_batch_concurrency: usize,
}

impl AiOrchestrator {
    pub fn new(registry: ProviderRegistry, config: &AiConfig) -> Self {
        Self {
            registry,
            defaults: config.defaults,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_batch_concurrency: config.max_batch_concurrency.max(1),
        }
    }

    /// Build the HTTP providers and orchestrator from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.ai.request_timeout_secs);
        let registry = ProviderRegistry::from_config(&config.providers, timeout)?;
        Ok(Self::new(registry, &config.ai))
    }

    pub fn defaults(&self) -> &OperationDefaults {
        &self.defaults
    }

    pub fn list_providers(&self) -> Vec<ProviderDescriptor> {
        self.registry.list()
    }

    /// Registered and configured provider for `kind`.
    pub fn resolve_provider(&self, kind: ProviderKind) -> Result<&SharedProvider> {
        let provider = self
            .registry
            .get(kind)
            .ok_or_else(|| NovelError::UnknownProvider(kind.to_string()))?;

        if !provider.is_available() {
            return Err(NovelError::ProviderUnavailable(kind));
        }
        Ok(provider)
    }

    // =========================================================================
    // Single operations
    // =========================================================================

    #[instrument(skip(self, request), fields(chars = request.text.chars().count()))]
    pub async fn polish(
        &self,
        request: &PolishRequest,
        provider: Option<ProviderKind>,
    ) -> Result<PolishResult> {
        let kind = provider.unwrap_or(self.defaults.polish);
        let adapter = self.resolve_provider(kind)?;

        self.polish_with(kind, adapter, request)
            .await
            .inspect_err(|e| error!("Polish text error with {}: {}", kind, e))
    }

    #[instrument(skip(self, request), fields(chars = request.text.chars().count()))]
    pub async fn rewrite(
        &self,
        request: &RewriteRequest,
        provider: Option<ProviderKind>,
    ) -> Result<RewriteResult> {
        let kind = provider.unwrap_or(self.defaults.rewrite);
        let adapter = self.resolve_provider(kind)?;

        let response = self
            .call(
                kind,
                adapter,
                &rewrite_prompt(request),
                GenerationParams::rewrite(&request.text),
            )
            .await
            .inspect_err(|e| error!("Rewrite text error with {}: {}", kind, e))?;

        Ok(RewriteResult {
            original_text: request.text.clone(),
            rewritten_text: response.content,
            provider: kind,
            usage: response.usage,
        })
    }

    #[instrument(skip(self, request), fields(kind = %request.kind))]
    pub async fn suggest(
        &self,
        request: &SuggestionRequest,
        provider: Option<ProviderKind>,
    ) -> Result<SuggestionResult> {
        let kind = provider.unwrap_or(self.defaults.suggest);
        let adapter = self.resolve_provider(kind)?;

        self.suggest_with(kind, adapter, request)
            .await
            .inspect_err(|e| error!("Generate suggestions error with {}: {}", kind, e))
    }

    /// Polish a stored chapter. Not-found and forbidden errors come from `chapters`.
    ///
    /// The lookup is blocking I/O and runs on the blocking thread pool.
    #[instrument(skip(self, chapters, options))]
    pub async fn polish_chapter<S>(
        &self,
        chapters: &S,
        chapter_id: &str,
        caller_id: &str,
        options: &PolishOptions,
        provider: Option<ProviderKind>,
    ) -> Result<ChapterPolishResult>
    where
        S: ChapterSource + Clone + 'static,
    {
        let source = chapters.clone();
        let (id, caller) = (chapter_id.to_string(), caller_id.to_string());
        let chapter = tokio::task::spawn_blocking(move || source.chapter_content(&id, &caller))
            .await
            .map_err(|e| NovelError::Storage(format!("Chapter lookup task failed: {}", e)))??;

        let mut context = format!("This text is the chapter \"{}\" of a novel.", chapter.title);
        if let Some(extra) = options.context.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            context.push(' ');
            context.push_str(extra);
        }

        let request = PolishRequest {
            text: chapter.content,
            style: options.style,
            focus: options.focus,
            context: Some(context),
        };

        let polish = self.polish(&request, provider).await?;
        Ok(ChapterPolishResult {
            chapter_id: chapter.id,
            chapter_title: chapter.title,
            polish,
        })
    }

    // =========================================================================
    // Aggregate operations
    // =========================================================================

    /// Polish every text independently, at most `max_batch_concurrency` at a time.
    ///
    /// Items may finish in any order; each output item keeps the index of its
    /// input text.
    #[instrument(skip(self, texts, options), fields(total = texts.len()))]
    pub async fn batch_polish(
        &self,
        texts: Vec<String>,
        options: &PolishOptions,
        provider: Option<ProviderKind>,
    ) -> Result<BatchPolishResult> {
        let kind = provider.unwrap_or(self.defaults.batch);

        debug!(
            "Dispatching {} polish calls to {} (concurrency {})",
            texts.len(),
            kind,
            self.max_batch_concurrency
        );

        let outcomes: Vec<(usize, Result<PolishResult>)> =
            stream::iter(texts.into_iter().enumerate())
                .map(|(index, text)| {
                    let request = PolishRequest::with_options(text, options);
                    async move {
                        let outcome = self.settle_polish(kind, &request).await;
                        if let Err(e) = &outcome {
                            warn!("Batch item {} failed: {}", index, e);
                        }
                        (index, outcome)
                    }
                })
                .buffer_unordered(self.max_batch_concurrency)
                .collect()
                .await;

        let result = BatchPolishResult::from_outcomes(outcomes);
        info!(
            "Batch polish completed: {}/{} succeeded",
            result.success_count, result.total
        );
        Ok(result)
    }

    /// Three concurrent suggestion calls, one per facet.
    ///
    /// A failed facet is reported as `None`, including when the provider
    /// cannot be resolved; the call itself never fails on a facet.
    #[instrument(skip(self, request), fields(chars = request.text.chars().count()))]
    pub async fn analyze(
        &self,
        request: &AnalyzeRequest,
        provider: Option<ProviderKind>,
    ) -> Result<AnalysisResult> {
        let kind = provider.unwrap_or(self.defaults.analyze);

        let facet = |aspect: SuggestionKind| {
            let request = SuggestionRequest {
                text: request.text.clone(),
                kind: aspect,
                context: request.context.clone(),
            };
            async move {
                self.settle_suggest(kind, &request)
                    .await
                    .inspect_err(|e| warn!("Analysis facet {} failed: {}", aspect, e))
                    .ok()
            }
        };

        let (grammar, style, plot) = tokio::join!(
            facet(SuggestionKind::Grammar),
            facet(SuggestionKind::Style),
            facet(SuggestionKind::Plot),
        );

        let suggestions = AnalysisFacets {
            grammar,
            style,
            plot,
        };
        info!(
            "Analysis completed: {}/3 facets settled",
            suggestions.settled_count()
        );

        Ok(AnalysisResult {
            text: request.text.clone(),
            word_count: request.text.chars().count(),
            suggestions,
            provider: kind,
        })
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// One fan-out item: resolution failures settle like provider failures.
    async fn settle_polish(
        &self,
        kind: ProviderKind,
        request: &PolishRequest,
    ) -> Result<PolishResult> {
        let adapter = self.resolve_provider(kind)?;
        self.polish_with(kind, adapter, request).await
    }

    async fn settle_suggest(
        &self,
        kind: ProviderKind,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResult> {
        let adapter = self.resolve_provider(kind)?;
        self.suggest_with(kind, adapter, request).await
    }

    async fn polish_with(
        &self,
        kind: ProviderKind,
        adapter: &SharedProvider,
        request: &PolishRequest,
    ) -> Result<PolishResult> {
        let response = self
            .call(
                kind,
                adapter,
                &polish_prompt(request),
                GenerationParams::polish(&request.text),
            )
            .await?;

        Ok(PolishResult {
            original_text: request.text.clone(),
            polished_text: response.content,
            provider: kind,
            usage: response.usage,
        })
    }

    async fn suggest_with(
        &self,
        kind: ProviderKind,
        adapter: &SharedProvider,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResult> {
        let response = self
            .call(
                kind,
                adapter,
                &suggestion_prompt(request),
                GenerationParams::suggest(),
            )
            .await?;

        Ok(SuggestionResult {
            text: request.text.clone(),
            suggestions: response.content,
            kind: request.kind,
            provider: kind,
            usage: response.usage,
        })
    }

    async fn call(
        &self,
        kind: ProviderKind,
        adapter: &SharedProvider,
        prompt: &Prompt,
        params: GenerationParams,
    ) -> Result<LlmResponse> {
        let messages = prompt.messages();
        with_timeout(
            self.request_timeout,
            adapter.generate(&messages, params),
            kind.as_str(),
        )
        .await
    }
}
