//! Configuration for the SQLite backend.
//!
//! [`SqliteStoreConfig`] can be deserialized from any serde format, or built in
//! code through [`SqliteStoreBuilder`](crate::SqliteStoreBuilder).

use std::path::PathBuf;

use serde::Deserialize;

/// How long a write waits on another connection's lock before failing, in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Journal used for the database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// Readers keep working while a batch is being written, at the cost of
    /// `-wal` and `-shm` files next to the database.
    #[default]
    Wal,
    /// A single database file, for locations where the side files are a problem
    /// (read-only media, network shares).
    Delete,
}

impl JournalMode {
    /// Value for `PRAGMA journal_mode`.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// How hard SQLite flushes to disk on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// An acknowledged `add_row` survives power loss.
    #[default]
    Full,
    /// Faster commits; with WAL the last writes may be lost on power loss, but
    /// the file stays consistent.
    Normal,
}

impl SyncMode {
    /// Value for `PRAGMA synchronous`.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// What a read does when a stored row cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorruptRowPolicy {
    /// Abort the read with `CorruptDocument`.
    #[default]
    Fail,
    /// Leave the row out of the result and emit a warning naming it.
    Skip,
}

/// Configuration for [`SqliteStore`](crate::SqliteStore).
///
/// `path` is a database file or `:memory:`, never a directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    pub path: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub journal_mode: JournalMode,
    #[serde(default)]
    pub sync_mode: SyncMode,
    /// Handling of rows that fail to decode.
    #[serde(default)]
    pub corrupt_rows: CorruptRowPolicy,
}

const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl SqliteStoreConfig {
    /// Configuration with defaults for everything but the path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: JournalMode::default(),
            sync_mode: SyncMode::default(),
            corrupt_rows: CorruptRowPolicy::default(),
        }
    }
}
