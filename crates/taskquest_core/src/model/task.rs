//! Quest task domain model.
//!
//! # Responsibility
//! - Define the task record owned by the ledger.
//! - Provide the one-way completion transition.
//!
//! # Invariants
//! - `text` is stored trimmed and is never empty.
//! - `completed` only ever moves from `false` to `true`.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque task identifier.
///
/// Fresh ids are UUID v4 strings. Ids restored from older snapshots are kept
/// verbatim, whatever their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a new random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Declared difficulty tier of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unsupported difficulty `{other}`; expected low|medium|high"
            )),
        }
    }
}

/// One entry in the quest log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub difficulty: Difficulty,
    pub completed: bool,
}

impl Task {
    /// Creates an open task with a generated id.
    ///
    /// # Errors
    /// - `ValidationError::EmptyTaskText` when `text` is blank.
    pub fn new(text: &str, difficulty: Difficulty) -> Result<Self, ValidationError> {
        Self::with_id(TaskId::generate(), text, difficulty)
    }

    /// Creates an open task with a caller-provided id.
    ///
    /// Surrounding whitespace is stripped from `text`.
    pub fn with_id(
        id: TaskId,
        text: &str,
        difficulty: Difficulty,
    ) -> Result<Self, ValidationError> {
        let task = Self {
            id,
            text: text.trim().to_string(),
            difficulty,
            completed: false,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::EmptyTaskId);
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyTaskText);
        }
        Ok(())
    }

    /// Marks the task done.
    ///
    /// Returns `true` only for the first transition; later calls are no-ops.
    pub fn mark_completed(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }
}
