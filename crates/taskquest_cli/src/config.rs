//! Runtime configuration for the CLI.
//!
//! Flags win over environment variables; blank environment values count as
//! unset.

use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TASKQUEST_DB_PATH";
pub const LOG_DIR_ENV: &str = "TASKQUEST_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "TASKQUEST_LOG_LEVEL";
const DEFAULT_DB_FILE_NAME: &str = "taskquest.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    /// File logging stays off when unset.
    pub log_dir: Option<String>,
    pub log_level: String,
}

impl CliConfig {
    pub fn resolve(
        db: Option<PathBuf>,
        log_dir: Option<String>,
        log_level: Option<String>,
    ) -> Self {
        Self::resolve_with(db, log_dir, log_level, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        db: Option<PathBuf>,
        log_dir: Option<String>,
        log_level: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let lookup = |key: &str| {
            env(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = db
            .or_else(|| lookup(DB_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_dir = log_dir.or_else(|| lookup(LOG_DIR_ENV));
        let log_level = log_level
            .or_else(|| lookup(LOG_LEVEL_ENV))
            .unwrap_or_else(|| taskquest_core::default_log_level().to_string());

        Self {
            db_path,
            log_dir,
            log_level,
        }
    }
}
