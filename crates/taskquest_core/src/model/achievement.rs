//! Achievement identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Id of the built-in "complete 5 quests" achievement.
pub const BEGINNER_ADVENTURER: &str = "BEGINNER_ADVENTURER";

/// Stable achievement identifier as stored in the unlocked list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(String);

impl AchievementId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for AchievementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AchievementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
