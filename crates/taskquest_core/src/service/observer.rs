//! Notification contract between the session and its presentation layer.
//!
//! Callbacks run synchronously on the caller's thread, after the in-memory
//! mutation and before the snapshot is written.

use crate::service::projection::{AchievementView, StateProjection};

pub trait SessionObserver {
    /// Called once per level reached, in ascending order.
    fn on_level_up(&mut self, _level: u32) {}

    /// Called once per newly granted achievement.
    fn on_achievement_unlocked(&mut self, _achievement: &AchievementView) {}

    /// Called after every successful mutation with the fresh projection.
    fn on_state_changed(&mut self, _projection: &StateProjection) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

impl<T: SessionObserver + ?Sized> SessionObserver for &mut T {
    fn on_level_up(&mut self, level: u32) {
        (**self).on_level_up(level);
    }

    fn on_achievement_unlocked(&mut self, achievement: &AchievementView) {
        (**self).on_achievement_unlocked(achievement);
    }

    fn on_state_changed(&mut self, projection: &StateProjection) {
        (**self).on_state_changed(projection);
    }
}
