//! Shared test utilities for the doclib test suite.
//!
//! Synthetic image writers, a dimension reader, and [`MemoryStore`], an
//! in-memory [`Store`] that records what the synchronizer asked of it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("photo.jpg"), 400, 200);
//!
//! let store = MemoryStore::new().fail_insert("broken.txt");
//! // ... run a pass ...
//! assert_eq!(store.files(), vec!["photo.jpg"]);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use image::{ImageReader, Rgb, RgbImage};

use crate::store::{Row, Store, StoreError, check_field_count};

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Write a gradient PNG of the given size.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Dimensions of an image file, sniffing the format from its bytes.
pub fn read_dimensions(path: &Path) -> (u32, u32) {
    ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .into_dimensions()
        .unwrap()
}

// =========================================================================
// In-memory store
// =========================================================================

/// [`Store`] backed by a map of table name to rows.
///
/// Failures can be injected per filename: inserts whose first value, or
/// counts whose match value, equal an injected name return
/// [`StoreError::OperationFailed`] and log like the real store does.
#[derive(Default)]
pub struct MemoryStore {
    pub tables: RefCell<BTreeMap<String, Vec<Row>>>,
    pub failing_inserts: RefCell<Vec<String>>,
    pub failing_counts: RefCell<Vec<String>>,
    pub logged: RefCell<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_insert(self, name: &str) -> Self {
        self.failing_inserts.borrow_mut().push(name.to_string());
        self
    }

    pub fn fail_count(self, name: &str) -> Self {
        self.failing_counts.borrow_mut().push(name.to_string());
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.borrow().get(table).cloned().unwrap_or_default()
    }

    /// `file` column of every `files` row, in insertion order.
    pub fn files(&self) -> Vec<String> {
        self.rows("files")
            .into_iter()
            .filter_map(|mut row| row.remove("file"))
            .collect()
    }

    pub fn logged_kinds(&self) -> Vec<String> {
        self.logged.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    fn injected_failure(&self, kind: &str, name: &str) -> StoreError {
        let error = StoreError::OperationFailed(format!("injected {} failure for {}", kind, name));
        self.log_error("Store Error", &error.to_string());
        error
    }
}

impl Store for MemoryStore {
    fn insert(&self, table: &str, fields: &[&str], values: &[String]) -> Result<(), StoreError> {
        check_field_count(fields, values)?;
        if self.failing_inserts.borrow().contains(&values[0]) {
            return Err(self.injected_failure("insert", &values[0]));
        }
        let row: Row = fields
            .iter()
            .map(|f| f.to_string())
            .zip(values.iter().cloned())
            .collect();
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    fn count_matching(&self, table: &str, field: &str, value: &str) -> Result<u64, StoreError> {
        if self.failing_counts.borrow().iter().any(|n| n == value) {
            return Err(self.injected_failure("count", value));
        }
        Ok(self.select_matching(table, field, value)?.len() as u64)
    }

    fn select_matching(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Row>, StoreError> {
        Ok(self
            .rows(table)
            .into_iter()
            .filter(|row| row.get(field).is_some_and(|v| v == value))
            .collect())
    }

    fn update(
        &self,
        table: &str,
        field: &str,
        value: &str,
        where_field: &str,
        where_value: &str,
    ) -> Result<usize, StoreError> {
        let mut tables = self.tables.borrow_mut();
        let mut changed = 0;
        for row in tables.get_mut(table).into_iter().flatten() {
            if row.get(where_field).is_some_and(|v| v == where_value) {
                row.insert(field.to_string(), value.to_string());
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn log_error(&self, kind: &str, description: &str) {
        self.logged
            .borrow_mut()
            .push((kind.to_string(), description.to_string()));
    }
}
