//! Task ledger.
//!
//! # Responsibility
//! - Own the ordered quest log and every write to task records.
//! - Report first-time completions so rewards can be granted exactly once.
//!
//! # Invariants
//! - Append order is display order.
//! - Ids are unique within the ledger.
//! - Unknown ids and repeated completions are silent no-ops.

use crate::model::task::{Difficulty, Task, TaskId};
use crate::model::validation::ValidationError;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskLedger {
    tasks: Vec<Task>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from restored tasks.
    ///
    /// # Errors
    /// - Any record-level validation failure.
    /// - `ValidationError::DuplicateTaskId` when two tasks share an id.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            task.validate()?;
            if !seen.insert(task.id.clone()) {
                return Err(ValidationError::DuplicateTaskId(task.id.clone()));
            }
        }
        Ok(Self { tasks })
    }

    /// Appends a new open task and returns it.
    ///
    /// The ledger is untouched when validation fails.
    pub fn add_task(&mut self, text: &str, difficulty: Difficulty) -> Result<Task, ValidationError> {
        let mut task = Task::new(text, difficulty)?;
        while self.contains(&task.id) {
            task.id = TaskId::generate();
        }
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Completes a task for the first time.
    ///
    /// Returns the completed task, or `None` when the id is unknown or the
    /// task was already done.
    pub fn complete_task(&mut self, id: &TaskId) -> Option<&Task> {
        let task = self.tasks.iter_mut().find(|task| &task.id == id)?;
        if task.mark_completed() {
            Some(&*task)
        } else {
            None
        }
    }

    /// Removes a task; returns it when it existed.
    pub fn delete_task(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| &task.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
