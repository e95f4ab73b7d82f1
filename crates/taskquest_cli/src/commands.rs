//! Subcommand handlers.

use crate::config::CliConfig;
use crate::console::{render_achievement, render_status, render_task, ConsoleObserver};
use crate::Command;
use log::info;
use std::error::Error;
use taskquest_core::db::{open_db, DbError};
use taskquest_core::logging::LoggingError;
use taskquest_core::{
    encode_snapshot, init_logging, AchievementCatalog, GameSession, SessionError,
    SqliteStateStore, StateStore, StoreError, TaskId,
};

type CliResult = Result<(), Box<dyn Error>>;

const ONBOARD_HINT: &str = "no hero profile yet; run `taskquest onboard --name <NAME>` first";

pub fn run(config: &CliConfig, command: Command) -> CliResult {
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let store = SqliteStateStore::try_new(&conn)?;
    let mut session = GameSession::open(store, ConsoleObserver, AchievementCatalog::builtin())?;
    info!(
        "event=cli_command module=cli status=start onboarded={}",
        !session.needs_onboarding()
    );

    if session.needs_onboarding() && !matches!(command, Command::Onboard { .. }) {
        return Err(ONBOARD_HINT.into());
    }
    dispatch(&mut session, command)
}

fn dispatch<S: StateStore>(
    session: &mut GameSession<S, ConsoleObserver>,
    command: Command,
) -> CliResult {
    match command {
        Command::Onboard { name, class, force } => {
            if session.needs_onboarding() {
                session.onboard(&name, class)?;
                println!("Welcome, {} the {class}!", name.trim());
            } else if force {
                session.reonboard(&name, class)?;
                println!("Profile updated: {} the {class}.", name.trim());
            } else {
                return Err("hero profile already exists; pass --force to replace it".into());
            }
        }
        Command::Status => {
            let projection = session.projection().ok_or(ONBOARD_HINT)?;
            println!("{}", render_status(&projection));
        }
        Command::Add { text, difficulty } => {
            let task = session.add_task(&text, difficulty)?;
            println!("Quest added: {}", task.id);
        }
        Command::Complete { id } => match session.complete_task(&TaskId::from(id.as_str()))? {
            Some(outcome) => println!(
                "Quest complete: {} (+{} XP)",
                outcome.task.text, outcome.xp_awarded
            ),
            None => println!("Nothing to complete for {id}."),
        },
        Command::Delete { id } => match session.delete_task(&TaskId::from(id.as_str()))? {
            Some(task) => println!("Quest removed: {}", task.id),
            None => println!("No quest with id {id}."),
        },
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.tasks())?);
            } else if session.tasks().is_empty() {
                println!("No quests yet.");
            } else {
                for task in session.tasks() {
                    println!("{}", render_task(task));
                }
            }
        }
        Command::Achievements => {
            for achievement in session.achievement_views() {
                println!("{}", render_achievement(&achievement));
            }
        }
        Command::Export => {
            let snapshot = session.snapshot().ok_or(ONBOARD_HINT)?;
            println!("{}", encode_snapshot(&snapshot)?);
        }
    }
    Ok(())
}

/// Stable log code for a failed command.
pub fn error_code(err: &(dyn Error + 'static)) -> &'static str {
    if let Some(err) = err.downcast_ref::<SessionError>() {
        return match err {
            SessionError::Validation(_) => "invalid_input",
            SessionError::Progression(_) => "progression_failed",
            SessionError::Persistence(_) => "persistence_failed",
            SessionError::NotOnboarded => "not_onboarded",
            SessionError::AlreadyOnboarded => "already_onboarded",
        };
    }
    if err.is::<StoreError>() {
        return "store_unavailable";
    }
    if err.is::<DbError>() {
        return "db_open_failed";
    }
    if err.is::<LoggingError>() {
        return "logging_init_failed";
    }
    "command_failed"
}

#[cfg(test)]
mod tests {
    use super::error_code;
    use std::error::Error;
    use taskquest_core::db::DbError;
    use taskquest_core::{SessionError, StoreError, ValidationError};

    fn code(err: Box<dyn Error>) -> &'static str {
        error_code(err.as_ref())
    }

    #[test]
    fn session_errors_map_to_specific_codes() {
        assert_eq!(code(Box::new(SessionError::NotOnboarded)), "not_onboarded");
        assert_eq!(
            code(Box::new(SessionError::Validation(ValidationError::EmptyTaskText))),
            "invalid_input"
        );
        assert_eq!(
            code(Box::new(SessionError::Persistence(StoreError::InvalidData(
                "bad".to_string()
            )))),
            "persistence_failed"
        );
    }

    #[test]
    fn infrastructure_and_plain_errors_are_classified() {
        let schema = DbError::UnsupportedSchemaVersion {
            found: 9,
            supported: 1,
        };
        assert_eq!(code(Box::new(schema)), "db_open_failed");
        assert_eq!(code("hero profile already exists".into()), "command_failed");
    }
}
