// crates/score-ledger-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Score Store
// Description: Durable ScoreStore backed by SQLite.
// Purpose: Persist the latest score per pseudonymized code and subject.
// Dependencies: score-ledger-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ScoreStore`] using `SQLite`. All records
//! live in a single `scores` table; the schema version is tracked with
//! `PRAGMA user_version`. Every operation runs in its own transaction and is
//! committed before the call returns. Rows read back are re-validated and a
//! malformed row fails the read as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use score_ledger_core::CodeKey;
use score_ledger_core::ScoreEntry;
use score_ledger_core::ScoreStore;
use score_ledger_core::StoreError;
use score_ledger_core::SubjectName;
use score_ledger_core::Timestamp;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version recorded in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` score store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a configuration with default tuning for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages never embed code keys or raw codes.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row fails validation.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid configuration or input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps an engine error into [`SqliteStoreError::Db`].
#[allow(clippy::needless_pass_by_value, reason = "Used directly as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed score store.
///
/// # Invariants
/// - At most one row per `(code_key, subject)`.
/// - `SQLite` connection access is serialized through a mutex.
#[derive(Clone)]
pub struct SqliteScoreStore {
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteScoreStore {
    /// Opens an `SQLite`-backed score store, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when it carries an unsupported schema version.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the mutex is poisoned or the query fails.
    pub fn readiness(&self) -> Result<(), SqliteStoreError> {
        self.lock()?.execute_batch("SELECT 1;").map_err(db_error)
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Io("sqlite mutex poisoned".to_string()))
    }

    /// Inserts or replaces one record, keeping `updated_at` monotonic.
    fn upsert_row(
        &self,
        code_key: &CodeKey,
        subject: &SubjectName,
        score: f64,
    ) -> Result<Timestamp, SqliteStoreError> {
        if !score.is_finite() {
            return Err(SqliteStoreError::Invalid("score must be finite".to_string()));
        }
        let now = Timestamp::now().as_unix_millis();
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let updated_at: i64 = tx
            .query_row(
                "INSERT INTO scores (code_key, subject, score, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(code_key, subject) DO UPDATE SET
                     score = excluded.score,
                     updated_at = MAX(scores.updated_at, excluded.updated_at)
                 RETURNING updated_at",
                params![code_key.as_str(), subject.as_str(), score, now],
                |row| row.get(0),
            )
            .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(Timestamp::from_unix_millis(updated_at))
    }

    /// Deletes one record.
    fn delete_row(&self, code_key: &CodeKey, subject: &SubjectName) -> Result<bool, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let changed = tx
            .execute(
                "DELETE FROM scores WHERE code_key = ?1 AND subject = ?2",
                params![code_key.as_str(), subject.as_str()],
            )
            .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(changed > 0)
    }

    /// Deletes every record for a key.
    fn delete_key(&self, code_key: &CodeKey) -> Result<u64, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let changed = tx
            .execute("DELETE FROM scores WHERE code_key = ?1", params![code_key.as_str()])
            .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(u64::try_from(changed).unwrap_or(u64::MAX))
    }

    /// Reads every entry for a key ordered by subject.
    fn select_entries(&self, code_key: &CodeKey) -> Result<Vec<ScoreEntry>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT subject, score, updated_at FROM scores
                 WHERE code_key = ?1 ORDER BY subject ASC",
            )
            .map_err(db_error)?;
        let rows = statement
            .query_map(params![code_key.as_str()], read_raw_entry)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        drop(statement);
        drop(guard);
        rows.into_iter().map(RawEntry::validate).collect()
    }

    /// Reads the entry for one subject of a key.
    fn select_entry(
        &self,
        code_key: &CodeKey,
        subject: &SubjectName,
    ) -> Result<Option<ScoreEntry>, SqliteStoreError> {
        let guard = self.lock()?;
        let raw = guard
            .query_row(
                "SELECT subject, score, updated_at FROM scores
                 WHERE code_key = ?1 AND subject = ?2",
                params![code_key.as_str(), subject.as_str()],
                read_raw_entry,
            )
            .optional()
            .map_err(db_error)?;
        drop(guard);
        raw.map(RawEntry::validate).transpose()
    }

    /// Reads up to `limit` distinct keys in ascending order.
    fn select_keys(&self, limit: usize) -> Result<Vec<CodeKey>, SqliteStoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let guard = self.lock()?;
        let mut statement = guard
            .prepare("SELECT DISTINCT code_key FROM scores ORDER BY code_key ASC LIMIT ?1")
            .map_err(db_error)?;
        let keys = statement
            .query_map(params![limit], |row| row.get::<_, String>(0))
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        drop(statement);
        drop(guard);
        keys.into_iter()
            .map(|key| {
                CodeKey::parse(&key)
                    .ok_or_else(|| SqliteStoreError::Corrupt("stored code key is malformed".to_string()))
            })
            .collect()
    }

    /// Counts all records.
    fn select_count(&self) -> Result<u64, SqliteStoreError> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))
            .map_err(db_error)?;
        u64::try_from(count).map_err(|_| SqliteStoreError::Corrupt("negative row count".to_string()))
    }
}

impl ScoreStore for SqliteScoreStore {
    fn upsert(
        &self,
        code_key: &CodeKey,
        subject: &SubjectName,
        score: f64,
    ) -> Result<Timestamp, StoreError> {
        Ok(self.upsert_row(code_key, subject, score)?)
    }

    fn delete(&self, code_key: &CodeKey, subject: &SubjectName) -> Result<bool, StoreError> {
        Ok(self.delete_row(code_key, subject)?)
    }

    fn delete_all(&self, code_key: &CodeKey) -> Result<u64, StoreError> {
        Ok(self.delete_key(code_key)?)
    }

    fn lookup(&self, code_key: &CodeKey) -> Result<Vec<ScoreEntry>, StoreError> {
        Ok(self.select_entries(code_key)?)
    }

    fn lookup_one(
        &self,
        code_key: &CodeKey,
        subject: &SubjectName,
    ) -> Result<Option<ScoreEntry>, StoreError> {
        Ok(self.select_entry(code_key, subject)?)
    }

    fn list_keys(&self, limit: usize) -> Result<Vec<CodeKey>, StoreError> {
        Ok(self.select_keys(limit)?)
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.select_count()?)
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Entry columns as stored, before validation.
struct RawEntry {
    /// Stored subject text.
    subject: String,
    /// Stored score.
    score: f64,
    /// Stored write time (unix ms).
    updated_at: i64,
}

impl RawEntry {
    /// Validates stored columns and converts them to an entry.
    fn validate(self) -> Result<ScoreEntry, SqliteStoreError> {
        let subject = SubjectName::new(&self.subject)
            .filter(|subject| subject.as_str() == self.subject)
            .ok_or_else(|| SqliteStoreError::Corrupt("stored subject is not normalized".to_string()))?;
        if !self.score.is_finite() {
            return Err(SqliteStoreError::Corrupt("stored score is not finite".to_string()));
        }
        Ok(ScoreEntry {
            subject,
            score: self.score,
            updated_at: Timestamp::from_unix_millis(self.updated_at),
        })
    }
}

/// Reads entry columns from a result row.
fn read_raw_entry(row: &Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok(RawEntry {
        subject: row.get(0)?,
        score: row.get(1)?,
        updated_at: row.get(2)?,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    let version: i64 =
        tx.query_row("PRAGMA user_version", [], |row| row.get(0)).map_err(db_error)?;
    match version {
        0 => {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS scores (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    code_key TEXT NOT NULL,
                    subject TEXT NOT NULL,
                    score REAL NOT NULL,
                    updated_at INTEGER NOT NULL,
                    UNIQUE(code_key, subject)
                );",
            )
            .map_err(db_error)?;
            tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
                .map_err(db_error)?;
        }
        value if value == SCHEMA_VERSION => {}
        value => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
