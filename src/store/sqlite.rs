//! SQLite implementation of the catalog [`Store`].
//!
//! The database holds two tables:
//!
//! ```text
//! files (id, file UNIQUE, filename, filetype, size, uploaded, updated)
//! log   (id, date, type, description)
//! ```
//!
//! `files.file` is `UNIQUE`, so two passes racing to catalog the same new
//! file cannot both succeed; the loser's insert fails and is logged.

use super::{ErrorLog, Row, Store, StoreError, check_field_count, check_identifier};
use crate::config::StoreConfig;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params, params_from_iter};
use std::path::{Path, PathBuf};

/// Category written to `log.type` for failed store operations.
const STORE_ERROR: &str = "Store Error";

pub struct SqliteStore {
    conn: Connection,
    db_path: PathBuf,
    error_log: ErrorLog,
}

impl SqliteStore {
    /// Open (or create) the database described by `config`.
    ///
    /// Failures are written to the flat error log and returned as
    /// [`StoreError::Unavailable`]; callers should treat them as fatal.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let error_log = ErrorLog::new(&config.error_log);
        let connect = || -> Result<Self, String> {
            if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty())
            {
                std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
            }
            let conn = Connection::open(&config.database).map_err(|e| e.to_string())?;
            conn.busy_timeout(config.busy_timeout())
                .map_err(|e| e.to_string())?;
            let store = Self {
                conn,
                db_path: config.database.clone(),
                error_log: error_log.clone(),
            };
            store.init_schema().map_err(|e| e.to_string())?;
            Ok(store)
        };

        match connect() {
            Ok(store) => {
                tracing::info!("Catalog database at {}", store.db_path.display());
                Ok(store)
            }
            Err(e) => {
                let message = format!("{}: {}", config.database.display(), e);
                error_log.record(&message);
                tracing::error!("Cannot open catalog database {}", message);
                Err(StoreError::Unavailable(message))
            }
        }
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory(error_log: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let store = Self {
            conn,
            db_path: PathBuf::from(":memory:"),
            error_log: ErrorLog::new(error_log),
        };
        store
            .init_schema()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(store)
    }

    /// Create the catalog and log tables if they don't exist.
    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                file        TEXT NOT NULL UNIQUE,
                filename    TEXT NOT NULL,
                filetype    TEXT NOT NULL,
                size        TEXT NOT NULL,
                uploaded    INTEGER NOT NULL,
                updated     INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                date        INTEGER NOT NULL,
                type        TEXT NOT NULL,
                description TEXT NOT NULL
            );",
        )
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Close the connection, reporting any error from finalizing it.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn
            .close()
            .map_err(|(_, e)| StoreError::OperationFailed(e.to_string()))
    }

    /// Log a failed operation and hand back the error for the caller.
    fn fail(&self, error: StoreError) -> StoreError {
        tracing::error!("{}", error);
        self.log_error(STORE_ERROR, &error.to_string());
        error
    }

    fn operation_failed(&self, error: rusqlite::Error) -> StoreError {
        self.fail(StoreError::OperationFailed(error.to_string()))
    }

    fn identifier<'a>(&self, name: &'a str) -> Result<&'a str, StoreError> {
        check_identifier(name).map_err(|e| self.fail(e))
    }
}

fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).to_string()),
    }
}

impl Store for SqliteStore {
    fn insert(&self, table: &str, fields: &[&str], values: &[String]) -> Result<(), StoreError> {
        let table = self.identifier(table)?;
        check_field_count(fields, values).map_err(|e| self.fail(e))?;
        let columns = fields
            .iter()
            .map(|f| self.identifier(f))
            .collect::<Result<Vec<_>, _>>()?;

        let placeholders = (1..=values.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );

        self.conn
            .execute(&sql, params_from_iter(values.iter()))
            .map_err(|e| self.operation_failed(e))?;
        Ok(())
    }

    fn count_matching(&self, table: &str, field: &str, value: &str) -> Result<u64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            self.identifier(table)?,
            self.identifier(field)?
        );
        let count: i64 = self
            .conn
            .query_row(&sql, [value], |row| row.get(0))
            .map_err(|e| self.operation_failed(e))?;
        Ok(count.max(0) as u64)
    }

    fn select_matching(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Row>, StoreError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            self.identifier(table)?,
            self.identifier(field)?
        );
        let query = || -> rusqlite::Result<Vec<Row>> {
            let mut stmt = self.conn.prepare(&sql)?;
            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let rows = stmt.query_map([value], |row| {
                let mut out = Row::new();
                for (i, name) in columns.iter().enumerate() {
                    if let Some(v) = value_to_string(row.get_ref(i)?) {
                        out.insert(name.clone(), v);
                    }
                }
                Ok(out)
            })?;
            rows.collect()
        };
        query().map_err(|e| self.operation_failed(e))
    }

    fn update(
        &self,
        table: &str,
        field: &str,
        value: &str,
        where_field: &str,
        where_value: &str,
    ) -> Result<usize, StoreError> {
        let sql = format!(
            "UPDATE {} SET {} = ?1 WHERE {} = ?2",
            self.identifier(table)?,
            self.identifier(field)?,
            self.identifier(where_field)?
        );
        self.conn
            .execute(&sql, params![value, where_value])
            .map_err(|e| self.operation_failed(e))
    }

    /// Write to the `log` table, falling back to the flat file.
    fn log_error(&self, kind: &str, description: &str) {
        let now = chrono::Utc::now().timestamp();
        let written = self.conn.execute(
            "INSERT INTO log (date, type, description) VALUES (?1, ?2, ?3)",
            params![now, kind, description],
        );
        if let Err(e) = written {
            self.error_log
                .record(&format!("{} (log table unavailable: {})", description, e));
        }
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("error_log", &self.error_log.path())
            .finish()
    }
}
