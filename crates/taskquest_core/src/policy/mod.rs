//! Reward and leveling policies.
//!
//! # Responsibility
//! - Map difficulty tiers to experience rewards.
//! - Compute the experience needed to clear a level.
//!
//! # Invariants
//! - Both functions are pure and total over their inputs.
//! - `threshold_for` is strictly increasing and positive for `level >= 1`,
//!   which bounds the level-up loop in `service::progression`.

use crate::model::task::Difficulty;

/// Experience granted for completing a task of the given tier.
pub fn reward_for(difficulty: Difficulty) -> u64 {
    match difficulty {
        Difficulty::Low => 10,
        Difficulty::Medium => 20,
        Difficulty::High => 30,
    }
}

/// Experience required to advance past `level`: `round(100 * level^1.5)`.
pub fn threshold_for(level: u32) -> u64 {
    (100.0 * f64::from(level).powf(1.5)).round() as u64
}

/// Share of the current level already earned.
///
/// Clamped to `[0, 1]`; strictly below 1 whenever `xp < threshold_for(level)`.
pub fn xp_fraction(level: u32, xp: u64) -> f64 {
    let needed = threshold_for(level);
    if needed == 0 {
        return 0.0;
    }
    (xp as f64 / needed as f64).clamp(0.0, 1.0)
}
