//! Core progression engine for TaskQuest.
//! This crate is the single source of truth for leveling and achievement rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::achievement::{AchievementId, BEGINNER_ADVENTURER};
pub use model::player::{Identity, PlayerClass, ProgressionState};
pub use model::state::AggregateState;
pub use model::task::{Difficulty, Task, TaskId};
pub use model::validation::ValidationError;
pub use policy::{reward_for, threshold_for, xp_fraction};
pub use repo::state_repo::{
    decode_snapshot, encode_snapshot, MemoryStateStore, SqliteStateStore, StateStore, StoreError,
    StoreResult, SNAPSHOT_KEY,
};
pub use service::achievement::{
    AchievementCatalog, AchievementContext, AchievementDefinition, AchievementEvaluator,
    CatalogError,
};
pub use service::observer::{NoopObserver, SessionObserver};
pub use service::progression::{LevelUpReport, ProgressionEngine, ProgressionError};
pub use service::projection::{AchievementView, StateProjection};
pub use service::session::{CompletionOutcome, GameSession, SessionError};
pub use service::task_ledger::TaskLedger;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
