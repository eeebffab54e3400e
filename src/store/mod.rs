//! Persistent key-value-row store used for the file catalog.
//!
//! The synchronizer only ever talks to the [`Store`] trait, so it can be
//! driven by the SQLite implementation in production and an in-memory
//! recorder in tests. The contract is deliberately narrow:
//!
//! | Operation | Meaning |
//! |---|---|
//! | [`insert`](Store::insert) | one row, fields and values paired by position |
//! | [`count_matching`](Store::count_matching) | rows where `field = value` |
//! | [`select_matching`](Store::select_matching) | those rows, as string maps |
//! | [`update`](Store::update) | set one field on rows where `field = value` |
//! | [`log_error`](Store::log_error) | record a failure in the persistent error log |
//!
//! Values are always bound, never spliced into statement text. Table and
//! field names cannot be bound, so they must pass [`check_identifier`].
//!
//! Every failed operation is recorded through the error log before it is
//! returned; callers decide whether to continue.

pub mod error_log;
pub mod sqlite;

pub use error_log::ErrorLog;
pub use sqlite::SqliteStore;

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store operation failed: {0}")]
    OperationFailed(String),
    #[error("Field/value count mismatch: {fields} fields, {values} values")]
    FieldCountMismatch { fields: usize, values: usize },
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// One row, column name → value rendered as text.
pub type Row = BTreeMap<String, String>;

/// The catalog store contract.
pub trait Store {
    /// Insert one row. `fields` and `values` are paired by position.
    fn insert(&self, table: &str, fields: &[&str], values: &[String]) -> Result<(), StoreError>;

    /// Count rows where `field = value`.
    fn count_matching(&self, table: &str, field: &str, value: &str) -> Result<u64, StoreError>;

    /// Fetch rows where `field = value`.
    fn select_matching(&self, table: &str, field: &str, value: &str)
    -> Result<Vec<Row>, StoreError>;

    /// Set `field = value` on rows where `where_field = where_value`.
    /// Returns the number of rows changed.
    fn update(
        &self,
        table: &str,
        field: &str,
        value: &str,
        where_field: &str,
        where_value: &str,
    ) -> Result<usize, StoreError>;

    /// Record a failure in the persistent error log.
    fn log_error(&self, kind: &str, description: &str);
}

/// Validate a table or column name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn check_identifier(name: &str) -> Result<&str, StoreError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Check that an insert pairs every field with exactly one value.
pub fn check_field_count(fields: &[&str], values: &[String]) -> Result<(), StoreError> {
    if fields.is_empty() || fields.len() != values.len() {
        return Err(StoreError::FieldCountMismatch {
            fields: fields.len(),
            values: values.len(),
        });
    }
    Ok(())
}
