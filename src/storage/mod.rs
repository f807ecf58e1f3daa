pub mod chapters;
pub mod database;
pub mod ordering;

pub use chapters::ChapterStore;
pub use database::{Database, PoolConfig, SharedDatabase};
pub use ordering::{MoveOutcome, NormalizeOutcome, OrderMaintainer, OrderReport};
