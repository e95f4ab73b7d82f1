//! Player identity and progression records.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Role picked during onboarding. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerClass {
    #[default]
    Paladin,
    Knight,
    Necromancer,
    Assassin,
    Healer,
    Mage,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 6] = [
        PlayerClass::Paladin,
        PlayerClass::Knight,
        PlayerClass::Necromancer,
        PlayerClass::Assassin,
        PlayerClass::Healer,
        PlayerClass::Mage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paladin => "Paladin",
            Self::Knight => "Knight",
            Self::Necromancer => "Necromancer",
            Self::Assassin => "Assassin",
            Self::Healer => "Healer",
            Self::Mage => "Mage",
        }
    }

    /// Display icon shown next to the player name.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Paladin => "🛡️",
            Self::Knight => "⚔️",
            Self::Necromancer => "🔮",
            Self::Assassin => "🗡️",
            Self::Healer => "💖",
            Self::Mage => "🧘",
        }
    }
}

impl Display for PlayerClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerClass {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| {
                format!(
                    "unsupported class `{normalized}`; expected Paladin|Knight|Necromancer|Assassin|Healer|Mage"
                )
            })
    }
}

/// Who is playing. Captured once at onboarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub class: PlayerClass,
}

impl Identity {
    /// Builds an identity from raw onboarding input.
    ///
    /// # Errors
    /// - `ValidationError::EmptyDisplayName` when the trimmed name is empty.
    pub fn new(display_name: &str, class: PlayerClass) -> Result<Self, ValidationError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ValidationError::EmptyDisplayName);
        }
        Ok(Self {
            display_name: display_name.to_string(),
            class,
        })
    }
}

/// Level and experience within the current level.
///
/// After every award `xp < threshold_for(level)` holds; see
/// `service::progression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub level: u32,
    pub xp: u64,
}

impl ProgressionState {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.level == 0 {
            return Err(ValidationError::InvalidLevel { level: self.level });
        }
        Ok(())
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self { level: 1, xp: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::{Identity, PlayerClass, ProgressionState};
    use crate::model::validation::ValidationError;

    #[test]
    fn identity_trims_name() {
        let identity = Identity::new("  Aria ", PlayerClass::Mage).unwrap();
        assert_eq!(identity.display_name, "Aria");
    }

    #[test]
    fn identity_rejects_blank_name() {
        assert_eq!(
            Identity::new("   ", PlayerClass::Knight).unwrap_err(),
            ValidationError::EmptyDisplayName
        );
    }

    #[test]
    fn class_parses_any_case() {
        assert_eq!("necromancer".parse::<PlayerClass>().unwrap(), PlayerClass::Necromancer);
        assert!("bard".parse::<PlayerClass>().is_err());
    }

    #[test]
    fn fresh_progression_starts_at_level_one() {
        let state = ProgressionState::default();
        assert_eq!((state.level, state.xp), (1, 0));
        assert!(state.validate().is_ok());
        assert!(ProgressionState { level: 0, xp: 0 }.validate().is_err());
    }
}
