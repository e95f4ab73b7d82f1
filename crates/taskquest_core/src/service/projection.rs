//! Read-only projections handed to presentation code.

use crate::model::achievement::AchievementId;
use crate::model::player::Identity;
use crate::model::task::Task;
use crate::service::achievement::AchievementDefinition;

/// One catalog entry together with its lock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementView {
    pub id: AchievementId,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub unlocked: bool,
}

impl AchievementView {
    pub fn from_definition(definition: &AchievementDefinition, unlocked: bool) -> Self {
        Self {
            id: definition.id.clone(),
            icon: definition.icon.clone(),
            title: definition.title.clone(),
            description: definition.description.clone(),
            unlocked,
        }
    }
}

/// Everything a renderer needs after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct StateProjection {
    pub identity: Identity,
    pub level: u32,
    pub xp: u64,
    /// Threshold of the current level.
    pub xp_to_next_level: u64,
    /// `policy::xp_fraction(level, xp)`; below 1 for every resolved state.
    pub xp_fraction: f64,
    /// Display order.
    pub tasks: Vec<Task>,
    /// Whole catalog, unlocked or not.
    pub achievements: Vec<AchievementView>,
}
