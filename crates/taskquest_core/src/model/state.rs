//! Persisted aggregate snapshot.
//!
//! # Responsibility
//! - Define the unit of serialization handed to the state store.
//! - Reject structurally invalid snapshots at deserialization time.
//!
//! # Invariants
//! - Field names match the external snapshot schema
//!   (`username`, `playerClass`, `level`, `xp`, `tasks`, `achievements`).
//! - Task ids are unique; the unlocked list holds no duplicates.

use crate::model::achievement::AchievementId;
use crate::model::player::{Identity, PlayerClass, ProgressionState};
use crate::model::task::Task;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identity, progression, quest log and unlocked achievements in one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawAggregateState")]
pub struct AggregateState {
    pub username: String,
    pub player_class: PlayerClass,
    pub level: u32,
    pub xp: u64,
    /// Display order is insertion order.
    pub tasks: Vec<Task>,
    /// Unlock order is preserved for stable re-serialization.
    pub achievements: Vec<AchievementId>,
}

impl AggregateState {
    /// Fresh state right after onboarding.
    pub fn new(identity: &Identity) -> Self {
        let progression = ProgressionState::default();
        Self {
            username: identity.display_name.clone(),
            player_class: identity.class,
            level: progression.level,
            xp: progression.xp,
            tasks: Vec::new(),
            achievements: Vec::new(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            display_name: self.username.clone(),
            class: self.player_class,
        }
    }

    pub fn progression(&self) -> ProgressionState {
        ProgressionState {
            level: self.level,
            xp: self.xp,
        }
    }

    /// Checks snapshot-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyDisplayName);
        }
        self.progression().validate()?;

        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            task.validate()?;
            if !seen.insert(&task.id) {
                return Err(ValidationError::DuplicateTaskId(task.id.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAggregateState {
    username: String,
    player_class: PlayerClass,
    level: u32,
    xp: u64,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    achievements: Vec<AchievementId>,
}

impl TryFrom<RawAggregateState> for AggregateState {
    type Error = ValidationError;

    fn try_from(raw: RawAggregateState) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(raw.achievements.len());
        let achievements = raw
            .achievements
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let state = Self {
            username: raw.username,
            player_class: raw.player_class,
            level: raw.level,
            xp: raw.xp,
            tasks: raw.tasks,
            achievements,
        };
        state.validate()?;
        Ok(state)
    }
}
