//! Domain model for quest tasks, player identity and persisted progress.
//!
//! # Responsibility
//! - Define canonical data structures shared by ledger, engine and store.
//! - Own the wire shape of the persisted snapshot.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` unique within one snapshot.
//! - A completed task never reverts to incomplete.
//! - `level >= 1` for every reachable progression state.

pub mod achievement;
pub mod player;
pub mod state;
pub mod task;
pub mod validation;
