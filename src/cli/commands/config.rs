//! Config Command
//!
//! Usage:
//!   novelcraft config show [--json]
//!   novelcraft config path
//!   novelcraft config init [-g] [--force]

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(output: Output) -> Result<()> {
    ConfigLoader::show_config(output.is_json())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file
pub fn init(output: Output, global: bool, force: bool) -> Result<()> {
    let existed = if global {
        ConfigLoader::global_config_path().is_some_and(|p| p.exists())
    } else {
        ConfigLoader::project_config_path().exists()
    };

    let path = ConfigLoader::init(global, force)?;
    let scope = if global { "global" } else { "project" };

    if existed && !force {
        output.warning(&format!(
            "{} config already exists, use --force to overwrite",
            scope
        ));
    } else {
        output.success(&format!("Initialized {} configuration", scope));
    }
    output.emit(&serde_json::json!({ "scope": scope, "path": path }), |_| {
        println!("  Config: {}", path.display());
    })
}
