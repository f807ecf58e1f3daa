//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Kinds
//!
//! - **UnknownProvider**: the requested provider is not registered
//! - **ProviderUnavailable**: the provider lacks credentials, endpoint or model
//! - **ProviderError**: upstream HTTP or protocol failure (timeouts included)
//! - **InvalidOrder**: a chapter move target outside `1..=N`
//! - **NotFound / Forbidden**: raised by the chapter store, propagated unchanged

use serde::Serialize;
use thiserror::Error;

use crate::ai::provider::ProviderKind;

// =============================================================================
// Error Kinds
// =============================================================================

/// Stable, machine-readable error kinds exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnknownProvider,
    ProviderUnavailable,
    ProviderError,
    InvalidOrder,
    NotFound,
    Forbidden,
    Validation,
    Config,
    Storage,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProvider => write!(f, "UNKNOWN_PROVIDER"),
            Self::ProviderUnavailable => write!(f, "PROVIDER_UNAVAILABLE"),
            Self::ProviderError => write!(f, "PROVIDER_ERROR"),
            Self::InvalidOrder => write!(f, "INVALID_ORDER"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Config => write!(f, "CONFIG"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Structured error handed to callers: a kind plus a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&NovelError> for ErrorReport {
    fn from(err: &NovelError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum NovelError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    #[error("Provider {0} not found")]
    UnknownProvider(String),

    #[error("Provider {0} is not available: missing API key, URL or model")]
    ProviderUnavailable(ProviderKind),

    /// Upstream failure; `message` carries the provider's own error text when it sent one
    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Invalid order position {requested}: must be between 1 and {max}")]
    InvalidOrder { requested: i64, max: u32 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, NovelError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl NovelError {
    /// Create a provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error; timeouts are reported as provider failures
    pub fn timeout(provider: impl Into<String>, duration: std::time::Duration) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: format!("request timed out after {}s", duration.as_secs()),
        }
    }

    /// Machine-readable kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownProvider(_) => ErrorKind::UnknownProvider,
            Self::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            Self::Provider { .. } => ErrorKind::ProviderError,
            Self::InvalidOrder { .. } => ErrorKind::InvalidOrder,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(_) => ErrorKind::Config,
            Self::Database(_) | Self::Storage(_) => ErrorKind::Storage,
            Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// Structured form of this error
    pub fn report(&self) -> ErrorReport {
        ErrorReport::from(self)
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| NovelError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| NovelError::Storage(format!("{}: {}", f().into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================
