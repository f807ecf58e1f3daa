//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::ai::AiOrchestrator;
use crate::cli::Output;
use crate::config::{Config, ConfigLoader};
use crate::storage::{ChapterStore, Database, PoolConfig};
use crate::types::{NovelError, Result};

/// Command execution context
///
/// Everything a command handler needs: the chapter store, the orchestrator
/// and the identity the command acts on behalf of.
#[derive(Clone)]
pub struct CommandContext {
    store: Option<ChapterStore>,
    pub orchestrator: Arc<AiOrchestrator>,
    /// Owner id used for every ownership check
    pub caller: String,
    pub output: Output,
}

impl CommandContext {
    /// Load config, open the configured database and build the providers.
    pub fn load(caller: &str, output: Output) -> Result<Self> {
        let config = ConfigLoader::load()?;
        let db = open_database(&config.database.path, config.database.pool_max_size)?;
        let store = ChapterStore::new(Arc::new(db));
        Self::assemble(&config, Some(store), caller, output)
    }

    /// Load context without opening a database
    ///
    /// For AI commands that act on raw text and never touch stored chapters.
    pub fn load_without_db(caller: &str, output: Output) -> Result<Self> {
        let config = ConfigLoader::load()?;
        Self::assemble(&config, None, caller, output)
    }

    fn assemble(
        config: &Config,
        store: Option<ChapterStore>,
        caller: &str,
        output: Output,
    ) -> Result<Self> {
        let caller = require_caller(caller)?;
        let orchestrator = Arc::new(AiOrchestrator::from_config(config)?);

        Ok(Self {
            store,
            orchestrator,
            caller,
            output,
        })
    }

    /// Chapter store, or an error when the context was loaded without one
    pub fn store(&self) -> Result<&ChapterStore> {
        self.store.as_ref().ok_or_else(|| {
            NovelError::Storage("No database open for this command".to_string())
        })
    }
}

/// Open (and migrate) the chapter database at `path`.
pub fn open_database(path: &Path, pool_max_size: Option<u32>) -> Result<Database> {
    let mut pool = PoolConfig::auto();
    if let Some(max_size) = pool_max_size {
        pool.max_size = max_size;
        pool.min_idle = pool.min_idle.min(max_size);
    }

    debug!(
        "Opening database {} (pool size {})",
        path.display(),
        pool.max_size
    );
    let db = Database::open_with_config(path, pool)?;
    db.initialize()?;
    Ok(db)
}

fn require_caller(caller: &str) -> Result<String> {
    let caller = caller.trim();
    if caller.is_empty() {
        return Err(NovelError::Validation(
            "No user given: pass --user or set $USER".to_string(),
        ));
    }
    Ok(caller.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_database_creates_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("novel.db");

        let db = open_database(&path, Some(2)).unwrap();
        let store = ChapterStore::new(Arc::new(db));
        let project = store.create_project("alice", "Winter", None).unwrap();

        assert!(path.exists());
        assert!(store.list_chapters("alice", &project.id).unwrap().is_empty());
    }

    #[test]
    fn test_context_without_db_has_no_store() {
        let ctx = CommandContext {
            store: None,
            orchestrator: Arc::new(AiOrchestrator::from_config(&Config::default()).unwrap()),
            caller: "alice".to_string(),
            output: Output::new(true),
        };

        assert!(matches!(ctx.store(), Err(NovelError::Storage(_))));
    }

    #[test]
    fn test_require_caller() {
        assert_eq!(require_caller(" alice ").unwrap(), "alice");
        assert!(matches!(
            require_caller("  "),
            Err(NovelError::Validation(_))
        ));
    }
}
