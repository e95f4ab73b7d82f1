//! State store contracts, snapshot codec and implementations.
//!
//! # Responsibility
//! - Serialize the aggregate snapshot to and from its JSON wire form.
//! - Persist exactly one snapshot under a fixed key (last writer wins).
//!
//! # Invariants
//! - `decode_snapshot(encode_snapshot(s)) == s` for every valid snapshot.
//! - Reads reject invalid persisted payloads instead of masking them.
//! - Writes replace the whole snapshot; there is no partial update.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::state::AggregateState;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed key the snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "taskQuestState";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure surfaced to session callers.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// Stored payload exists but does not decode to a valid snapshot.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "snapshot serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Encodes a snapshot to its canonical JSON text.
pub fn encode_snapshot(state: &AggregateState) -> StoreResult<String> {
    serde_json::to_string(state).map_err(StoreError::Serialization)
}

/// Decodes and validates a snapshot from JSON text.
pub fn decode_snapshot(payload: &str) -> StoreResult<AggregateState> {
    serde_json::from_str(payload).map_err(|err| StoreError::InvalidData(err.to_string()))
}

/// Durable home of the aggregate snapshot.
pub trait StateStore {
    /// Returns the stored snapshot, or `None` before first onboarding.
    fn load(&self) -> StoreResult<Option<AggregateState>>;
    /// Overwrites the stored snapshot.
    fn save(&self, state: &AggregateState) -> StoreResult<()>;
}

/// SQLite-backed snapshot store.
pub struct SqliteStateStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateStore<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `StoreError::UninitializedConnection` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl StateStore for SqliteStateStore<'_> {
    fn load(&self) -> StoreResult<Option<AggregateState>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM state_snapshots WHERE key = ?1;",
                [SNAPSHOT_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => match decode_snapshot(&payload) {
                Ok(state) => {
                    debug!(
                        "event=snapshot_load module=repo status=ok tasks={} achievements={}",
                        state.tasks.len(),
                        state.achievements.len()
                    );
                    Ok(Some(state))
                }
                Err(err) => {
                    error!(
                        "event=snapshot_load module=repo status=error error_code=invalid_snapshot error={}",
                        err
                    );
                    Err(err)
                }
            },
            None => {
                debug!("event=snapshot_load module=repo status=noop reason=missing");
                Ok(None)
            }
        }
    }

    fn save(&self, state: &AggregateState) -> StoreResult<()> {
        let payload = encode_snapshot(state)?;
        self.conn.execute(
            "INSERT INTO state_snapshots (key, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![SNAPSHOT_KEY, payload],
        )?;
        debug!(
            "event=snapshot_save module=repo status=ok bytes={}",
            payload.len()
        );
        Ok(())
    }
}

/// In-process snapshot store holding the encoded payload.
///
/// Counts writes so callers can assert when persistence happened.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    payload: RefCell<Option<String>>,
    saves: Cell<usize>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an existing snapshot.
    pub fn with_snapshot(state: &AggregateState) -> StoreResult<Self> {
        let store = Self::new();
        store.payload.replace(Some(encode_snapshot(state)?));
        Ok(store)
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Last written payload, verbatim.
    pub fn payload(&self) -> Option<String> {
        self.payload.borrow().clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> StoreResult<Option<AggregateState>> {
        self.payload
            .borrow()
            .as_deref()
            .map(decode_snapshot)
            .transpose()
    }

    fn save(&self, state: &AggregateState) -> StoreResult<()> {
        let payload = encode_snapshot(state)?;
        self.payload.replace(Some(payload));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
