//! Catalog synchronization.
//!
//! Brings the `files` table in line with what a filtered directory listing
//! says is on disk. For every entry, in listing order:
//!
//! ```text
//! entry ──► image type? ──yes──► crop dir/name → thumb_dir/name
//!   │                               (failure: log, keep going)
//!   ▼
//! count rows where file = name
//!   ├── ≥ 1 ──► already cataloged, nothing to do
//!   └── 0 ────► insert file, filename, filetype, size, uploaded, updated
//! ```
//!
//! Records are only ever created. A file that changes on disk keeps its
//! original row, and thumbnails are re-cropped on every pass.
//!
//! Failures are per file: a broken image, a failed count or a failed insert
//! is logged, recorded in the [`SyncReport`], and the pass moves on.

use crate::imaging::{CropOutcome, ImageBackend, ThumbnailConfig, crop_thumbnail};
use crate::scan::{AllowedTypes, DirectoryEntry, allowed_types};
use crate::size::format_size;
use crate::store::{Row, Store};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Table holding one row per cataloged file.
pub const FILES_TABLE: &str = "files";

/// Columns written by an insert, in value order.
pub const FILES_FIELDS: [&str; 6] = [
    "file", "filename", "filetype", "size", "uploaded", "updated",
];

const KEY_FIELD: &str = "file";
const THUMBNAIL_ERROR: &str = "Thumbnail Error";
const CATALOG_ERROR: &str = "Catalog Error";

/// One row of the `files` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRecord {
    /// Full filename; unique across the catalog.
    pub file: String,
    pub filename: String,
    pub filetype: String,
    /// Human-readable size at the time of first observation.
    pub size: String,
    /// Unix seconds.
    pub uploaded_at: i64,
    /// Unix seconds. Equal to `uploaded_at`; rows are never updated.
    pub updated_at: i64,
}

impl CatalogRecord {
    pub fn new(entry: &DirectoryEntry, size: String, now: i64) -> Self {
        Self {
            file: entry.name.clone(),
            filename: entry.base_name.clone(),
            filetype: entry.extension.clone(),
            size,
            uploaded_at: now,
            updated_at: now,
        }
    }

    /// Values paired with [`FILES_FIELDS`].
    pub fn values(&self) -> Vec<String> {
        vec![
            self.file.clone(),
            self.filename.clone(),
            self.filetype.clone(),
            self.size.clone(),
            self.uploaded_at.to_string(),
            self.updated_at.to_string(),
        ]
    }

    /// Rebuild a record from a stored row. `None` if a column is missing or
    /// a timestamp is not an integer.
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            file: row.get("file")?.clone(),
            filename: row.get("filename")?.clone(),
            filetype: row.get("filetype")?.clone(),
            size: row.get("size")?.clone(),
            uploaded_at: row.get("uploaded")?.parse().ok()?,
            updated_at: row.get("updated")?.parse().ok()?,
        })
    }
}

/// Knobs for one synchronization pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub thumbnail: ThumbnailConfig,
    /// Extensions that get a thumbnail. Case-sensitive.
    pub image_types: AllowedTypes,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            thumbnail: ThumbnailConfig::default(),
            image_types: allowed_types(["jpg", "gif", "png", "bmp"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailOutcome {
    NotImage,
    Copied,
    Cropped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOutcome {
    Inserted,
    AlreadyCataloged,
    Failed(String),
}

/// What happened to one entry during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub name: String,
    pub thumbnail: ThumbnailOutcome,
    pub catalog: CatalogOutcome,
}

/// Per-file results of a pass, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub files: Vec<FileOutcome>,
}

impl SyncReport {
    pub fn inserted(&self) -> usize {
        self.count(|f| f.catalog == CatalogOutcome::Inserted)
    }

    pub fn already_cataloged(&self) -> usize {
        self.count(|f| f.catalog == CatalogOutcome::AlreadyCataloged)
    }

    pub fn thumbnails_written(&self) -> usize {
        self.count(|f| {
            matches!(
                f.thumbnail,
                ThumbnailOutcome::Copied | ThumbnailOutcome::Cropped
            )
        })
    }

    /// Entries with at least one failed step.
    pub fn failures(&self) -> usize {
        self.count(|f| {
            matches!(f.thumbnail, ThumbnailOutcome::Failed(_))
                || matches!(f.catalog, CatalogOutcome::Failed(_))
        })
    }

    pub fn outcome(&self, name: &str) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.name == name)
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(f)).count()
    }
}

/// Runs synchronization passes against a store and an image backend.
pub struct CatalogSync<'a, S: Store, B: ImageBackend> {
    store: &'a S,
    backend: &'a B,
    options: SyncOptions,
}

impl<'a, S: Store, B: ImageBackend> CatalogSync<'a, S, B> {
    pub fn new(store: &'a S, backend: &'a B, options: SyncOptions) -> Self {
        Self {
            store,
            backend,
            options,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn is_image(&self, entry: &DirectoryEntry) -> bool {
        self.options.image_types.contains(&entry.extension)
    }

    /// Synchronize `entries` (found in `dir`) into the catalog, writing
    /// thumbnails for image types into `thumb_dir`.
    pub fn synchronize(
        &self,
        entries: &[DirectoryEntry],
        dir: &Path,
        thumb_dir: &Path,
    ) -> SyncReport {
        tracing::info!(
            "Synchronizing {} entries from {}",
            entries.len(),
            dir.display()
        );

        if entries.iter().any(|e| self.is_image(e)) {
            if let Err(e) = fs::create_dir_all(thumb_dir) {
                // Each crop below will fail and be reported on its own
                tracing::warn!(
                    "Cannot create thumbnail directory {}: {}",
                    thumb_dir.display(),
                    e
                );
            }
        }

        let now = chrono::Utc::now().timestamp();
        let files = entries
            .iter()
            .map(|entry| {
                let source = dir.join(&entry.name);
                let outcome = FileOutcome {
                    name: entry.name.clone(),
                    thumbnail: self.thumbnail(entry, &source, thumb_dir),
                    catalog: self.catalog(entry, &source, now),
                };
                tracing::debug!(
                    "{}: thumbnail {:?}, catalog {:?}",
                    outcome.name,
                    outcome.thumbnail,
                    outcome.catalog
                );
                outcome
            })
            .collect();

        let report = SyncReport { files };
        tracing::info!(
            "Synchronized {}: {} inserted, {} already cataloged, {} thumbnails, {} failures",
            dir.display(),
            report.inserted(),
            report.already_cataloged(),
            report.thumbnails_written(),
            report.failures()
        );
        report
    }

    fn thumbnail(
        &self,
        entry: &DirectoryEntry,
        source: &Path,
        thumb_dir: &Path,
    ) -> ThumbnailOutcome {
        if !self.is_image(entry) {
            return ThumbnailOutcome::NotImage;
        }

        let destination = thumb_dir.join(&entry.name);
        match crop_thumbnail(self.backend, source, &destination, &self.options.thumbnail) {
            Ok(CropOutcome::Copied) => ThumbnailOutcome::Copied,
            Ok(CropOutcome::Cropped) => ThumbnailOutcome::Cropped,
            Err(e) => {
                let message = format!("{}: {}", source.display(), e);
                tracing::warn!("Thumbnail failed for {}", message);
                self.store.log_error(THUMBNAIL_ERROR, &message);
                ThumbnailOutcome::Failed(e.to_string())
            }
        }
    }

    fn catalog(&self, entry: &DirectoryEntry, source: &Path, now: i64) -> CatalogOutcome {
        // The store logs its own failures; only report them here
        let existing = match self
            .store
            .count_matching(FILES_TABLE, KEY_FIELD, &entry.name)
        {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Skipping {}: existence check failed: {}", entry.name, e);
                return CatalogOutcome::Failed(e.to_string());
            }
        };
        if existing > 0 {
            return CatalogOutcome::AlreadyCataloged;
        }

        let bytes = match fs::metadata(source) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                let message = format!("{}: {}", source.display(), e);
                tracing::warn!("Cannot stat {}", message);
                self.store.log_error(CATALOG_ERROR, &message);
                return CatalogOutcome::Failed(e.to_string());
            }
        };

        let record = CatalogRecord::new(entry, format_size(bytes), now);
        match self
            .store
            .insert(FILES_TABLE, &FILES_FIELDS, &record.values())
        {
            Ok(()) => CatalogOutcome::Inserted,
            Err(e) => {
                tracing::warn!("Insert failed for {}: {}", entry.name, e);
                CatalogOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::MemoryStore;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn entries(names: &[&str]) -> Vec<DirectoryEntry> {
        names
            .iter()
            .map(|n| DirectoryEntry::from_name(n).unwrap())
            .collect()
    }

    fn write_files(dir: &Path, files: &[(&str, usize)]) {
        for &(name, len) in files {
            fs::write(dir.join(name), vec![b'x'; len]).unwrap();
        }
    }

    fn thumb_dir(tmp: &TempDir) -> PathBuf {
        tmp.path().join("crop")
    }

    #[test]
    fn inserts_new_files_with_formatted_size() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("memo.txt", 12), ("report.pdf", 1536)]);
        let store = MemoryStore::new();
        let backend = MockBackend::new();

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["memo.txt", "report.pdf"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        assert_eq!(report.inserted(), 2);
        let rows = store.rows(FILES_TABLE);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["file"], "memo.txt");
        assert_eq!(rows[0]["filename"], "memo");
        assert_eq!(rows[0]["filetype"], "txt");
        assert_eq!(rows[0]["size"], "12 b");
        assert_eq!(rows[1]["size"], "1.5 kb");
        assert_eq!(rows[0]["uploaded"], rows[0]["updated"]);
    }

    #[test]
    fn non_images_get_no_thumbnail() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("memo.txt", 3)]);
        let store = MemoryStore::new();
        let backend = MockBackend::new();

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["memo.txt"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        assert_eq!(report.files[0].thumbnail, ThumbnailOutcome::NotImage);
        assert!(backend.get_operations().is_empty());
        assert!(!thumb_dir(&tmp).exists());
    }

    #[test]
    fn large_image_is_cropped_into_thumbnail_dir() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("photo.jpg", 10)]);
        let store = MemoryStore::new();
        let backend = MockBackend::with_dimensions(&[("photo.jpg", 400, 200)]);

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["photo.jpg"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        assert_eq!(report.files[0].thumbnail, ThumbnailOutcome::Cropped);
        assert!(thumb_dir(&tmp).is_dir());
        let expected = thumb_dir(&tmp).join("photo.jpg");
        assert!(backend.get_operations().iter().any(|op| matches!(
            op,
            RecordedOp::Thumbnail { output, size: 100, .. } if *output == expected.to_string_lossy()
        )));
    }

    #[test]
    fn small_image_is_copied() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("icon.png"), b"tiny png bytes").unwrap();
        let store = MemoryStore::new();
        let backend = MockBackend::with_dimensions(&[("icon.png", 50, 50)]);

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["icon.png"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        assert_eq!(report.files[0].thumbnail, ThumbnailOutcome::Copied);
        assert_eq!(
            fs::read(thumb_dir(&tmp).join("icon.png")).unwrap(),
            b"tiny png bytes"
        );
    }

    #[test]
    fn second_pass_inserts_nothing_but_recrops() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("photo.jpg", 10), ("memo.txt", 4)]);
        let store = MemoryStore::new();
        let backend = MockBackend::with_dimensions(&[("photo.jpg", 400, 200)]);
        let sync = CatalogSync::new(&store, &backend, SyncOptions::default());
        let listing = entries(&["memo.txt", "photo.jpg"]);

        let first = sync.synchronize(&listing, tmp.path(), &thumb_dir(&tmp));
        let second = sync.synchronize(&listing, tmp.path(), &thumb_dir(&tmp));

        assert_eq!(first.inserted(), 2);
        assert_eq!(second.inserted(), 0);
        assert_eq!(second.already_cataloged(), 2);
        assert_eq!(store.rows(FILES_TABLE).len(), 2);
        assert_eq!(backend.thumbnail_sources().len(), 2);
    }

    #[test]
    fn failed_insert_does_not_stop_the_pass() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("a.txt", 1), ("b.txt", 1), ("c.txt", 1)]);
        let store = MemoryStore::new().fail_insert("b.txt");
        let backend = MockBackend::new();

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["a.txt", "b.txt", "c.txt"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        assert_eq!(report.inserted(), 2);
        assert_eq!(report.failures(), 1);
        assert!(matches!(
            report.outcome("b.txt").unwrap().catalog,
            CatalogOutcome::Failed(_)
        ));
        assert_eq!(store.files(), vec!["a.txt", "c.txt"]);
    }

    #[test]
    fn failed_count_skips_insert() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("a.txt", 1)]);
        let store = MemoryStore::new().fail_count("a.txt");
        let backend = MockBackend::new();

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["a.txt"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        assert!(matches!(report.files[0].catalog, CatalogOutcome::Failed(_)));
        assert!(store.files().is_empty());
    }

    #[test]
    fn broken_image_is_still_cataloged() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("broken.png", 20)]);
        let store = MemoryStore::new();
        // No mock dimensions: identify fails like a corrupt file
        let backend = MockBackend::new();

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["broken.png"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        let outcome = report.outcome("broken.png").unwrap();
        assert!(matches!(outcome.thumbnail, ThumbnailOutcome::Failed(_)));
        assert_eq!(outcome.catalog, CatalogOutcome::Inserted);
        assert_eq!(store.logged_kinds(), vec![THUMBNAIL_ERROR]);
        assert!(!thumb_dir(&tmp).join("broken.png").exists());
    }

    #[test]
    fn vanished_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let backend = MockBackend::new();

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["gone.txt"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        assert!(matches!(report.files[0].catalog, CatalogOutcome::Failed(_)));
        assert_eq!(store.logged_kinds(), vec![CATALOG_ERROR]);
    }

    #[test]
    fn image_types_are_case_sensitive() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("SCAN.JPG", 5)]);
        let store = MemoryStore::new();
        let backend = MockBackend::with_dimensions(&[("SCAN.JPG", 400, 400)]);

        let report = CatalogSync::new(&store, &backend, SyncOptions::default()).synchronize(
            &entries(&["SCAN.JPG"]),
            tmp.path(),
            &thumb_dir(&tmp),
        );

        assert_eq!(report.files[0].thumbnail, ThumbnailOutcome::NotImage);
        assert_eq!(report.files[0].catalog, CatalogOutcome::Inserted);
    }

    #[test]
    fn record_round_trips_through_row() {
        let entry = DirectoryEntry::from_name("notes.txt").unwrap();
        let record = CatalogRecord::new(&entry, "2.0 kb".to_string(), 1_354_838_400);

        let row: Row = FILES_FIELDS
            .iter()
            .map(|f| f.to_string())
            .zip(record.values())
            .collect();
        assert_eq!(CatalogRecord::from_row(&row), Some(record));
    }

    #[test]
    fn record_from_incomplete_row_is_none() {
        let mut row = Row::new();
        row.insert("file".to_string(), "notes.txt".to_string());
        assert!(CatalogRecord::from_row(&row).is_none());
    }
}
