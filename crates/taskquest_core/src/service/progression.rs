//! Progression engine.
//!
//! # Responsibility
//! - Own level/xp state and apply experience awards.
//! - Resolve cascading level-ups iteratively, reporting each level reached.
//!
//! # Invariants
//! - After every successful award `0 <= xp < threshold(level)`.
//! - A failed award leaves state untouched.
//! - The threshold function must be positive for every level it is asked
//!   about; a zero threshold is reported instead of looping forever.

use crate::model::player::ProgressionState;
use crate::model::validation::ValidationError;
use crate::policy::threshold_for;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Leveling policy signature: xp needed to clear a level.
pub type ThresholdFn = fn(u32) -> u64;

/// Levels reached by one award, in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelUpReport {
    pub levels_reached: Vec<u32>,
}

impl LevelUpReport {
    pub fn is_empty(&self) -> bool {
        self.levels_reached.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    Validation(ValidationError),
    /// Leveling policy returned zero for `level`.
    NonPositiveThreshold { level: u32 },
    /// Level counter cannot grow past `u32::MAX`.
    LevelOverflow,
}

impl Display for ProgressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NonPositiveThreshold { level } => {
                write!(f, "leveling threshold for level {level} must be positive")
            }
            Self::LevelOverflow => write!(f, "level counter overflowed"),
        }
    }
}

impl Error for ProgressionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ProgressionError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    state: ProgressionState,
    threshold: ThresholdFn,
}

impl Default for ProgressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionEngine {
    /// Level 1, no experience, default leveling policy.
    pub fn new() -> Self {
        Self {
            state: ProgressionState::default(),
            threshold: threshold_for,
        }
    }

    /// Restores an engine from persisted state using the default policy.
    ///
    /// Pending level-ups in the restored state are resolved silently.
    pub fn from_state(state: ProgressionState) -> Result<Self, ProgressionError> {
        Self::with_threshold(state, threshold_for)
    }

    /// Restores an engine with a custom leveling policy.
    pub fn with_threshold(
        state: ProgressionState,
        threshold: ThresholdFn,
    ) -> Result<Self, ProgressionError> {
        state.validate()?;
        let (state, _) = resolve_level_ups(state, threshold)?;
        Ok(Self { state, threshold })
    }

    pub fn state(&self) -> ProgressionState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn xp(&self) -> u64 {
        self.state.xp
    }

    /// Experience required to clear the current level.
    pub fn xp_to_next_level(&self) -> u64 {
        (self.threshold)(self.state.level)
    }

    /// Adds signed experience from an external boundary.
    ///
    /// # Errors
    /// - `ValidationError::NegativeXpAward` for negative amounts.
    pub fn award_xp(&mut self, amount: i64) -> Result<LevelUpReport, ProgressionError> {
        let amount = u64::try_from(amount)
            .map_err(|_| ValidationError::NegativeXpAward { amount })?;
        self.award(amount)
    }

    /// Adds experience and resolves every level-up it triggers.
    pub fn award(&mut self, amount: u64) -> Result<LevelUpReport, ProgressionError> {
        let pending = ProgressionState {
            level: self.state.level,
            xp: self.state.xp.saturating_add(amount),
        };
        let (resolved, levels_reached) = resolve_level_ups(pending, self.threshold)?;
        self.state = resolved;
        Ok(LevelUpReport { levels_reached })
    }
}

fn resolve_level_ups(
    mut state: ProgressionState,
    threshold: ThresholdFn,
) -> Result<(ProgressionState, Vec<u32>), ProgressionError> {
    let mut levels_reached = Vec::new();
    loop {
        let needed = threshold(state.level);
        if needed == 0 {
            return Err(ProgressionError::NonPositiveThreshold { level: state.level });
        }
        if state.xp < needed {
            return Ok((state, levels_reached));
        }
        state.xp -= needed;
        state.level = state
            .level
            .checked_add(1)
            .ok_or(ProgressionError::LevelOverflow)?;
        levels_reached.push(state.level);
    }
}
