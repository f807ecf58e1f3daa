//! Global Constants
//!
//! Generation policy and tuning values. The per-operation sampling values are
//! part of the product's behaviour, not user configuration.

/// Generation policy per AI operation
pub mod generation {
    /// Polishing should stay close to the source text
    pub const POLISH_TEMPERATURE: f32 = 0.3;

    /// Polish budget is this many tokens per input character
    pub const POLISH_TOKENS_PER_CHAR: usize = 2;

    /// Lower bound for the polish token budget
    pub const POLISH_MIN_TOKENS: usize = 1000;

    /// Rewriting trades fidelity for variety
    pub const REWRITE_TEMPERATURE: f32 = 0.8;

    /// Rewrite budget is this many tokens per input character
    pub const REWRITE_TOKENS_PER_CHAR: usize = 3;

    /// Lower bound for the rewrite token budget
    pub const REWRITE_MIN_TOKENS: usize = 1500;

    /// Suggestions are the most exploratory operation
    pub const SUGGEST_TEMPERATURE: f32 = 0.9;

    /// Fixed token budget for suggestions
    pub const SUGGEST_MAX_TOKENS: usize = 1500;

    /// Provider defaults when a call does not override them
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Provider default token budget
    pub const DEFAULT_MAX_TOKENS: usize = 2000;
}

/// Network constants
pub mod network {
    /// Per-call timeout for provider requests (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// TCP connect timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;
}

/// Batch execution constants
pub mod batch {
    /// Default number of provider calls in flight for one batch
    pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
}

/// Provider endpoint defaults
pub mod providers {
    pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com";
    pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

    pub const DOUBAO_API_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";

    /// Path appended to every provider base URL
    pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
}
