//! SQLite storage engine for document stores.
//!
//! Every registered collection is a table with a single `data TEXT` column
//! holding one encoded document per row. Rows are read back in `rowid` order,
//! which is insertion order.

use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, params, params_from_iter, types::ValueRef};
use tracing::{debug, trace, warn};

use doctable_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    codec::{self, DecodeError, Document},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Query,
    registry::TableRegistry,
};

use crate::{
    config::{CorruptRowPolicy, JournalMode, SqliteStoreConfig, SyncMode},
    query::{SqlCondition, SqlQueryTranslator},
};

/// Document store backed by a single SQLite connection.
///
/// # Thread Safety
///
/// The connection sits behind a mutex and every operation holds it for its
/// whole duration, so a `SqliteStore` can be shared between threads; calls
/// are executed one at a time.
///
/// # Lifecycle
///
/// The connection is opened and every registered table is created by
/// [`SqliteStore::open`] / the builder. [`close`](StoreBackend::close) releases
/// it; later calls to `close` do nothing and every other operation fails with
/// [`DocumentStoreError::StorageUnavailable`]. Dropping the store also releases
/// the connection.
///
/// # Example
///
/// ```ignore
/// use doctable_sqlite::SqliteStore;
/// use doctable::{backend::StoreBackend, query::Query};
///
/// let store = SqliteStore::open("tracker.db")?;
/// let open_issues = store.find("issues", &Query::new().eq("status", "open"))?;
/// store.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SqliteStore {
    registry: TableRegistry,
    config: SqliteStoreConfig,
    connection: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Opens the database at `path` with the default registry and configuration.
    pub fn open(path: impl Into<std::path::PathBuf>) -> DocumentStoreResult<Self> {
        Self::builder(path).build()
    }

    pub fn builder(path: impl Into<std::path::PathBuf>) -> SqliteStoreBuilder {
        SqliteStoreBuilder::new(path)
    }

    pub fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.connection.lock().is_none()
    }

    fn connect(config: SqliteStoreConfig, registry: TableRegistry) -> DocumentStoreResult<Self> {
        registry.validate_identifiers()?;

        if config.path.is_dir() {
            return Err(DocumentStoreError::StorageUnavailable(format!(
                "{} is a directory, not a database file",
                config.path.display()
            )));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(&config.path, flags).map_err(|err| {
            DocumentStoreError::StorageUnavailable(format!(
                "cannot open {}: {err}",
                config.path.display()
            ))
        })?;

        apply_pragmas(&connection, &config)?;
        ensure_tables(&connection, &registry)?;

        debug!(
            path = %config.path.display(),
            tables = registry.entries().count(),
            "opened sqlite document store"
        );

        Ok(Self {
            registry,
            config,
            connection: Mutex::new(Some(connection)),
        })
    }

    /// Runs `f` with the live connection, or fails if the store is closed.
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> DocumentStoreResult<T>,
    ) -> DocumentStoreResult<T> {
        let mut guard = self.connection.lock();
        let connection = guard.as_mut().ok_or_else(|| {
            DocumentStoreError::StorageUnavailable("sqlite store is closed".to_string())
        })?;

        f(connection)
    }

    /// Reads and decodes the rows of `table` satisfying `condition`, in rowid order.
    fn read_rows(
        &self,
        collection: &str,
        table: &str,
        condition: Option<SqlCondition>,
    ) -> DocumentStoreResult<Vec<Document>> {
        let (sql, params) = match condition {
            None => (
                format!("SELECT rowid, data FROM {} ORDER BY rowid", quote_identifier(table)),
                Vec::new(),
            ),
            // Rows that are not JSON objects skip the predicate and reach the
            // decoder, so `find` reports them exactly as `get_all` does.
            Some(condition) => (
                format!(
                    "SELECT rowid, data FROM {} WHERE CASE WHEN NOT json_valid(data) THEN 1 \
                     WHEN json_type(data) = 'object' THEN ({}) ELSE 1 END ORDER BY rowid",
                    quote_identifier(table),
                    condition.sql
                ),
                condition.params,
            ),
        };

        trace!(collection, sql = %sql, params = params.len(), "reading rows");

        let raw_rows = self.with_connection(|connection| {
            let mut statement = connection.prepare(&sql).map_err(storage_io)?;
            let rows = statement
                .query_map(params_from_iter(params.iter()), |row| {
                    Ok((row.get::<_, i64>(0)?, RawRow::from(row.get_ref(1)?)))
                })
                .map_err(storage_io)?;

            rows.collect::<Result<Vec<_>, _>>().map_err(storage_io)
        })?;

        let mut documents = Vec::with_capacity(raw_rows.len());

        for (rowid, raw) in raw_rows {
            match raw.decode().map_err(|err| err.at_row(collection, rowid)) {
                Ok(document) => documents.push(document),
                Err(err) => match self.config.corrupt_rows {
                    CorruptRowPolicy::Fail => return Err(err),
                    CorruptRowPolicy::Skip => {
                        warn!(collection, rowid, error = %err, "skipping corrupt row");
                    }
                },
            }
        }

        Ok(documents)
    }
}

impl StoreBackend for SqliteStore {
    fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    fn add_row(&self, collection: &str, document: &Document) -> DocumentStoreResult<()> {
        let table = self.registry.resolve(collection)?;
        let blob = codec::encode(document)?;

        self.with_connection(|connection| {
            connection
                .execute(&insert_statement(table), params![blob])
                .map_err(storage_io)?;

            Ok(())
        })
    }

    fn add_all(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()> {
        let table = self.registry.resolve(collection)?;
        let blobs = documents
            .iter()
            .map(codec::encode)
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        self.with_connection(|connection| {
            // Dropping the transaction without commit rolls the batch back.
            let transaction = connection.transaction().map_err(storage_io)?;
            {
                let mut statement = transaction
                    .prepare(&insert_statement(table))
                    .map_err(storage_io)?;

                for blob in &blobs {
                    statement.execute(params![blob]).map_err(storage_io)?;
                }
            }
            transaction.commit().map_err(storage_io)?;

            trace!(collection, rows = blobs.len(), "inserted batch");

            Ok(())
        })
    }

    fn get_all(&self, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let table = self.registry.resolve(collection)?;

        self.read_rows(collection, table, None)
    }

    fn find(&self, collection: &str, query: &Query) -> DocumentStoreResult<Vec<Document>> {
        let table = self.registry.resolve(collection)?;
        let condition = query.accept(&mut SqlQueryTranslator)?;

        self.read_rows(collection, table, Some(condition))
    }

    fn close(&self) -> DocumentStoreResult<()> {
        let Some(connection) = self.connection.lock().take() else {
            return Ok(());
        };

        connection
            .close()
            .map_err(|(_, err)| DocumentStoreError::StorageIo(err.to_string()))?;

        debug!(path = %self.config.path.display(), "closed sqlite document store");

        Ok(())
    }
}

/// Builder for [`SqliteStore`].
///
/// # Example
///
/// ```ignore
/// use doctable_sqlite::{SqliteStore, config::CorruptRowPolicy};
/// use doctable::{backend::StoreBackendBuilder, registry::TableRegistry};
///
/// let store = SqliteStore::builder("tracker.db")
///     .registry(TableRegistry::from_names(["issues", "rules", "projects"]))
///     .corrupt_rows(CorruptRowPolicy::Skip)
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct SqliteStoreBuilder {
    config: SqliteStoreConfig,
    registry: TableRegistry,
}

impl SqliteStoreBuilder {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self::from_config(SqliteStoreConfig::new(path))
    }

    pub fn from_config(config: SqliteStoreConfig) -> Self {
        Self {
            config,
            registry: TableRegistry::default(),
        }
    }

    /// Uses `registry` instead of the default one.
    pub fn registry(mut self, registry: TableRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.config.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.config.journal_mode = mode;
        self
    }

    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.config.sync_mode = mode;
        self
    }

    pub fn corrupt_rows(mut self, policy: CorruptRowPolicy) -> Self {
        self.config.corrupt_rows = policy;
        self
    }
}

impl StoreBackendBuilder for SqliteStoreBuilder {
    type Backend = SqliteStore;

    /// Opens the connection and creates every missing registered table.
    ///
    /// Fails with [`DocumentStoreError::StorageUnavailable`] if the file cannot
    /// be opened, a pragma cannot be applied, or a table cannot be created.
    fn build(self) -> DocumentStoreResult<Self::Backend> {
        SqliteStore::connect(self.config, self.registry)
    }
}

/// Column value of a stored row before decoding.
enum RawRow {
    Text(String),
    Invalid(&'static str),
}

impl From<ValueRef<'_>> for RawRow {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => RawRow::Text(text.to_string()),
                Err(_) => RawRow::Invalid("data is not valid UTF-8"),
            },
            ValueRef::Null => RawRow::Invalid("data is NULL"),
            ValueRef::Integer(_) | ValueRef::Real(_) => RawRow::Invalid("data is a number, not text"),
            ValueRef::Blob(_) => RawRow::Invalid("data is a blob, not text"),
        }
    }
}

impl RawRow {
    fn decode(self) -> Result<Document, DecodeError> {
        match self {
            RawRow::Text(text) => codec::decode(&text),
            RawRow::Invalid(reason) => Err(DecodeError::new(reason)),
        }
    }
}

fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> DocumentStoreResult<()> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(unavailable)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(unavailable)?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(unavailable)?;

    Ok(())
}

fn ensure_tables(connection: &Connection, registry: &TableRegistry) -> DocumentStoreResult<()> {
    for (collection, table) in registry.entries() {
        connection
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (data TEXT);",
                quote_identifier(table)
            ))
            .map_err(unavailable)?;

        debug!(collection, table, "ensured table");
    }

    Ok(())
}

/// Table names come from the registry and are validated identifiers.
fn quote_identifier(table: &str) -> String {
    format!("\"{table}\"")
}

fn insert_statement(table: &str) -> String {
    format!("INSERT INTO {} (data) VALUES (?1)", quote_identifier(table))
}

fn storage_io(err: rusqlite::Error) -> DocumentStoreError {
    DocumentStoreError::StorageIo(err.to_string())
}

fn unavailable(err: rusqlite::Error) -> DocumentStoreError {
    DocumentStoreError::StorageUnavailable(err.to_string())
}
