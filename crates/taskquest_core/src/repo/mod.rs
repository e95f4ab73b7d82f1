//! Persistence adapters for the aggregate snapshot.
//!
//! # Responsibility
//! - Define the storage-agnostic `StateStore` contract used by sessions.
//! - Keep SQL and JSON encoding details out of the service layer.

pub mod state_repo;
