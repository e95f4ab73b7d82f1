//! Progression use-case services.
//!
//! # Responsibility
//! - Own ledger, progression and achievement state behind explicit handles.
//! - Orchestrate them per user action in `session`.
//! - Stay storage-agnostic; persistence goes through `repo::state_repo`.

pub mod achievement;
pub mod observer;
pub mod progression;
pub mod projection;
pub mod session;
pub mod task_ledger;
