//! novelcraft - Chapter Management and AI-Assisted Editing for Novels
//!
//! Keeps each project's chapters in a dense reading order and offers
//! polish, rewrite, suggestion and analysis operations backed by
//! chat-completion providers.
//!
//! ## Core Features
//!
//! - **Chapter Ordering**: positions stay exactly `1..=N` through inserts,
//!   moves and deletes, each applied in a single write transaction
//! - **Provider Adapters**: DeepSeek and Doubao behind one `LlmProvider` trait
//! - **Deterministic Prompts**: every prompt is a pure function of its request
//! - **Isolated Fan-out**: batch and analysis calls settle independently
//!
//! ## Quick Start
//!
//! ```ignore
//! use novelcraft::{AiOrchestrator, ChapterStore, ConfigLoader, Database};
//!
//! let config = ConfigLoader::load()?;
//! let db = Arc::new(Database::open(&config.database.path)?);
//! db.initialize()?;
//! let store = ChapterStore::new(db);
//! let orchestrator = AiOrchestrator::from_config(&config)?;
//!
//! let result = orchestrator
//!     .polish_chapter(&store, &chapter_id, "alice", &PolishOptions::default(), None)
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider adapters, prompts and the orchestrator
//! - [`storage`]: SQLite persistence and the chapter order maintainer
//! - [`config`]: layered configuration
//! - [`types`]: records, operation requests and errors

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorKind, ErrorReport, NovelError, Result, ResultExt};

// Storage
pub use storage::{
    ChapterStore, Database, MoveOutcome, NormalizeOutcome, OrderMaintainer, OrderReport,
    PoolConfig, SharedDatabase,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    AiOrchestrator, ChapterSource, LlmProvider, LlmResponse, ProviderKind, ProviderRegistry,
    with_timeout,
};
