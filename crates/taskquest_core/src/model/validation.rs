//! Boundary validation errors.

use crate::model::task::TaskId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invalid input rejected at a core boundary.
///
/// Raised before any mutation happens, so callers can rely on
/// all-or-nothing semantics when they receive this error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task text is empty after trimming whitespace.
    EmptyTaskText,
    /// Task id is an empty string.
    EmptyTaskId,
    /// Two tasks in one snapshot share the same id.
    DuplicateTaskId(TaskId),
    /// Display name is empty after trimming whitespace.
    EmptyDisplayName,
    /// Experience awards must be non-negative.
    NegativeXpAward { amount: i64 },
    /// Levels start at 1.
    InvalidLevel { level: u32 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskText => write!(f, "task text must not be empty"),
            Self::EmptyTaskId => write!(f, "task id must not be empty"),
            Self::DuplicateTaskId(id) => write!(f, "duplicate task id: {id}"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::NegativeXpAward { amount } => {
                write!(f, "xp award must be non-negative, got {amount}")
            }
            Self::InvalidLevel { level } => write!(f, "level must be >= 1, got {level}"),
        }
    }
}

impl Error for ValidationError {}
