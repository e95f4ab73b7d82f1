//! Plain-text presentation of session state.

use taskquest_core::{AchievementView, SessionObserver, StateProjection, Task};

const PROGRESS_BAR_WIDTH: usize = 20;

/// Prints level-up and unlock notifications as they happen.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_level_up(&mut self, level: u32) {
        println!("LEVEL UP! You reached level {level}!");
    }

    fn on_achievement_unlocked(&mut self, achievement: &AchievementView) {
        println!(
            "{} Achievement Unlocked: {}!",
            achievement.icon, achievement.title
        );
    }
}

pub fn render_status(projection: &StateProjection) -> String {
    let open = projection.tasks.iter().filter(|task| !task.completed).count();
    let done = projection.tasks.len() - open;
    let unlocked = projection
        .achievements
        .iter()
        .filter(|achievement| achievement.unlocked)
        .count();

    [
        format!(
            "{} {} the {}",
            projection.identity.class.icon(),
            projection.identity.display_name,
            projection.identity.class
        ),
        format!(
            "Level {}  {} / {} XP",
            projection.level, projection.xp, projection.xp_to_next_level
        ),
        progress_bar(projection.xp_fraction),
        format!("Quests: {open} open, {done} done"),
        format!(
            "Achievements: {unlocked}/{}",
            projection.achievements.len()
        ),
    ]
    .join("\n")
}

pub fn render_task(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!(
        "[{mark}] {}  {} ({})",
        task.id, task.text, task.difficulty
    )
}

pub fn render_achievement(achievement: &AchievementView) -> String {
    let state = if achievement.unlocked {
        "unlocked"
    } else {
        "locked"
    };
    format!(
        "{} {} [{state}]  {}",
        achievement.icon, achievement.title, achievement.description
    )
}

fn progress_bar(fraction: f64) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = ((fraction * PROGRESS_BAR_WIDTH as f64).floor() as usize).min(PROGRESS_BAR_WIDTH);
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        (fraction * 100.0).floor() as u32
    )
}
