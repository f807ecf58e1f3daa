//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/novelcraft/config.toml)
//! 3. Project config (.novelcraft/config.toml)
//! 4. Provider environment variables (DEEPSEEK_*, DOUBAO_*)
//! 5. Environment variables (NOVELCRAFT_*)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
