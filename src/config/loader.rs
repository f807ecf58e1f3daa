//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/novelcraft/config.toml)
//! 3. Project config (.novelcraft/config.toml)
//! 4. Provider environment variables (DEEPSEEK_API_KEY, DOUBAO_MODEL_ID, ...)
//! 5. Environment variables (NOVELCRAFT_* prefix, `__` between sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{NovelError, Result};

/// Provider variables recognised without the NOVELCRAFT_ prefix
const PROVIDER_ENV: &[(&str, &str)] = &[
    ("DEEPSEEK_API_KEY", "providers.deepseek.api_key"),
    ("DEEPSEEK_API_URL", "providers.deepseek.api_url"),
    ("DEEPSEEK_MODEL", "providers.deepseek.model"),
    ("DOUBAO_API_KEY", "providers.doubao.api_key"),
    ("DOUBAO_API_URL", "providers.doubao.api_url"),
    ("DOUBAO_MODEL_ID", "providers.doubao.model"),
];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Load configuration using explicit global and project file locations.
    pub fn load_from(global: Option<&Path>, project: &Path) -> Result<Config> {
        let config: Config = Self::figment(global, project)
            .extract()
            .map_err(|e| NovelError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn figment(global: Option<&Path>, project: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        figment
            .merge(Self::provider_env())
            // NOVELCRAFT_AI__REQUEST_TIMEOUT_SECS -> ai.request_timeout_secs
            .merge(Env::prefixed("NOVELCRAFT_").split("__"))
    }

    fn provider_env() -> Env {
        Env::raw().filter_map(|key| {
            PROVIDER_ENV
                .iter()
                .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                .map(|(_, path)| (*path).into())
        })
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/novelcraft/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("novelcraft"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".novelcraft")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration (API keys are never printed)
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| NovelError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a default config file, globally or for the current project.
    ///
    /// An existing file is left untouched unless `force` is set.
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let config_path = if global {
            Self::global_config_path().ok_or_else(|| {
                NovelError::Config("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    fn write_default(config_path: &Path, force: bool) -> Result<bool> {
        if config_path.exists() && !force {
            info!("Config exists: {}", config_path.display());
            return Ok(false);
        }

        if let Some(parent) = config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, Self::default_config())?;
        info!("Created config: {}", config_path.display());
        Ok(true)
    }

    /// Default config file content (TOML)
    fn default_config() -> &'static str {
        r#"# novelcraft configuration
# Project settings in .novelcraft/config.toml override ~/.config/novelcraft/config.toml.
# Every value can also be set through NOVELCRAFT_<SECTION>__<KEY> variables.

version = "1.0"

[database]
path = ".novelcraft/novelcraft.db"

[ai]
request_timeout_secs = 30
max_batch_concurrency = 8

[ai.defaults]
polish = "deepseek"
rewrite = "doubao"
suggest = "doubao"
batch = "deepseek"
analyze = "deepseek"

# API keys are best supplied through DEEPSEEK_API_KEY / DOUBAO_API_KEY.
[providers.deepseek]
api_url = "https://api.deepseek.com"
model = "deepseek-chat"

[providers.doubao]
api_url = "https://ark.cn-beijing.volces.com/api/v3"
# Endpoint id from the Volcano Engine console (also DOUBAO_MODEL_ID)
model = ""
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderKind;
    use figment::Jail;

    #[test]
    fn test_load_defaults_without_files() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::load_from(None, &jail.directory().join("missing.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.version, "1.0");
            assert_eq!(config.ai.request_timeout_secs, 30);
            Ok(())
        });
    }

    #[test]
    fn test_project_overrides_global() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "global.toml",
                r#"
                [ai]
                request_timeout_secs = 45
                max_batch_concurrency = 2
                "#,
            )?;
            jail.create_file(
                "project.toml",
                r#"
                [ai]
                max_batch_concurrency = 4

                [ai.defaults]
                rewrite = "deepseek"
                "#,
            )?;

            let config = ConfigLoader::load_from(
                Some(&jail.directory().join("global.toml")),
                &jail.directory().join("project.toml"),
            )
            .map_err(|e| e.to_string())?;

            assert_eq!(config.ai.request_timeout_secs, 45);
            assert_eq!(config.ai.max_batch_concurrency, 4);
            assert_eq!(config.ai.defaults.rewrite, ProviderKind::Deepseek);
            assert_eq!(config.ai.defaults.suggest, ProviderKind::Doubao);
            Ok(())
        });
    }

    #[test]
    fn test_provider_env_vars() {
        Jail::expect_with(|jail| {
            jail.set_env("DEEPSEEK_API_KEY", "sk-test");
            jail.set_env("DOUBAO_MODEL_ID", "ep-20240101");
            jail.set_env("NOVELCRAFT_AI__REQUEST_TIMEOUT_SECS", "12");

            let config = ConfigLoader::load_from(None, &jail.directory().join("none.toml"))
                .map_err(|e| e.to_string())?;

            assert_eq!(config.providers.deepseek.api_key, "sk-test");
            assert_eq!(config.providers.doubao.model, "ep-20240101");
            assert_eq!(config.ai.request_timeout_secs, 12);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("project.toml", "[ai]\nmax_batch_concurrency = 0\n")?;
            let result = ConfigLoader::load_from(None, &jail.directory().join("project.toml"));
            assert!(matches!(result, Err(NovelError::Config(_))));
            Ok(())
        });
    }

    #[test]
    fn test_write_default_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".novelcraft").join("config.toml");

        assert!(ConfigLoader::write_default(&path, false).unwrap());
        fs::write(&path, "version = \"custom\"\n").unwrap();

        assert!(!ConfigLoader::write_default(&path, false).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("custom"));

        assert!(ConfigLoader::write_default(&path, true).unwrap());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[providers.doubao]"));

        let config = ConfigLoader::load_from(None, &path).unwrap();
        assert_eq!(config.providers.doubao.api_url, crate::constants::providers::DOUBAO_API_URL);
    }
}
