//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/novelcraft/) and project (.novelcraft/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::ProviderKind;
use crate::constants::{batch, network, providers};
use crate::types::{NovelError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Chapter database settings
    pub database: DatabaseConfig,

    /// AI operation settings
    pub ai: AiConfig,

    /// Credentials and endpoints per provider
    pub providers: ProvidersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database: DatabaseConfig::default(),
            ai: AiConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `NovelError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.ai.request_timeout_secs == 0 {
            return Err(NovelError::Config(
                "ai.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.ai.max_batch_concurrency == 0 {
            return Err(NovelError::Config(
                "ai.max_batch_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.database.pool_max_size == Some(0) {
            return Err(NovelError::Config(
                "database.pool_max_size must be greater than 0".to_string(),
            ));
        }

        for kind in ProviderKind::ALL {
            self.providers.get(*kind).validate_url(*kind)?;
        }

        Ok(())
    }
}

// =============================================================================
// Database Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file holding projects and chapters
    pub path: PathBuf,

    /// Upper bound for pooled connections (CPU-based when unset)
    pub pool_max_size: Option<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".novelcraft/novelcraft.db"),
            pool_max_size: None,
        }
    }
}

// =============================================================================
// AI Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Per-call network timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum in-flight provider calls during batch polishing
    pub max_batch_concurrency: usize,

    /// Provider used when a call does not name one
    pub defaults: OperationDefaults,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            max_batch_concurrency: batch::DEFAULT_MAX_CONCURRENCY,
            defaults: OperationDefaults::default(),
        }
    }
}

/// Default provider per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationDefaults {
    pub polish: ProviderKind,
    pub rewrite: ProviderKind,
    pub suggest: ProviderKind,
    pub batch: ProviderKind,
    pub analyze: ProviderKind,
}

impl Default for OperationDefaults {
    fn default() -> Self {
        Self {
            polish: ProviderKind::Deepseek,
            rewrite: ProviderKind::Doubao,
            suggest: ProviderKind::Doubao,
            batch: ProviderKind::Deepseek,
            analyze: ProviderKind::Deepseek,
        }
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub deepseek: ProviderSettings,
    pub doubao: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            deepseek: ProviderSettings {
                api_key: String::new(),
                api_url: providers::DEEPSEEK_API_URL.to_string(),
                model: providers::DEEPSEEK_MODEL.to_string(),
            },
            doubao: ProviderSettings {
                api_key: String::new(),
                api_url: providers::DOUBAO_API_URL.to_string(),
                // Doubao models are addressed by endpoint id, which has no default
                model: String::new(),
            },
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Deepseek => &self.deepseek,
            ProviderKind::Doubao => &self.doubao,
        }
    }
}

/// Connection settings for one provider
///
/// The API key is never serialized to output and is redacted in debug output.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field(
                "api_key",
                &if self.api_key.is_empty() {
                    ""
                } else {
                    "[REDACTED]"
                },
            )
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

impl ProviderSettings {
    fn validate_url(&self, kind: ProviderKind) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Ok(());
        }

        let parsed = url::Url::parse(&self.api_url).map_err(|e| {
            NovelError::Config(format!(
                "providers.{}.api_url is not a valid URL ({}): {}",
                kind, self.api_url, e
            ))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NovelError::Config(format!(
                "providers.{}.api_url must use http or https, got {}",
                kind,
                parsed.scheme()
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ai.request_timeout_secs, 30);
        assert_eq!(config.ai.max_batch_concurrency, 8);
        assert_eq!(config.ai.defaults.polish, ProviderKind::Deepseek);
        assert_eq!(config.ai.defaults.rewrite, ProviderKind::Doubao);
        assert_eq!(config.ai.defaults.suggest, ProviderKind::Doubao);
    }

    #[test]
    fn test_default_providers_incomplete_without_keys() {
        let config = Config::default();
        assert!(config.providers.deepseek.api_key.is_empty());
        assert!(config.providers.doubao.api_key.is_empty());
        assert_eq!(config.providers.deepseek.model, "deepseek-chat");
        assert!(config.providers.doubao.model.is_empty());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.ai.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ai.max_batch_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.database.pool_max_size = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_provider_urls() {
        let mut config = Config::default();
        config.providers.doubao.api_url = "not a url".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("providers.doubao.api_url"));

        config.providers.doubao.api_url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        config.providers.doubao.api_url = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_redacted_and_not_serialized() {
        let settings = ProviderSettings {
            api_key: "sk-secret".into(),
            api_url: "https://api.deepseek.com".into(),
            model: "deepseek-chat".into(),
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));

        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
