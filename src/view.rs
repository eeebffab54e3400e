//! Presentation entry point.
//!
//! A [`DocumentView`] is bound to one documents directory and answers
//! [`show`](DocumentView::show) in one of two modes:
//!
//! - **List**: the filtered filenames, nothing else. No catalog access and
//!   no thumbnails. An unreadable directory shows as an empty list, and the
//!   scan error goes to the error log.
//! - **Button**: a full synchronization pass, then one [`Tile`] per file
//!   with its catalog record and thumbnail path for rendering.
//!
//! An unrecognized mode name shows nothing and touches nothing.

use crate::catalog::{
    CatalogRecord, CatalogSync, FILES_TABLE, SyncOptions, SyncReport, ThumbnailOutcome,
};
use crate::config::LibraryConfig;
use crate::imaging::ImageBackend;
use crate::scan::{AllowedTypes, DirectoryEntry, ScanError, filter_directory};
use crate::store::Store;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    List,
    Button,
}

impl DisplayMode {
    /// Parse a mode name. Exact, lowercase match.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "list" => Some(Self::List),
            "button" => Some(Self::Button),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Button => "button",
        }
    }
}

/// Everything needed to render one file as a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub name: String,
    /// `None` when the catalog has no row for the file, e.g. after a
    /// failed insert.
    pub record: Option<CatalogRecord>,
    /// Set when this pass wrote the thumbnail. A failed crop leaves it
    /// `None` even if an older thumbnail is still on disk.
    pub thumbnail: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutput {
    List(Vec<String>),
    Buttons { tiles: Vec<Tile>, report: SyncReport },
    Nothing,
}

/// Category written to the error log when list mode cannot read its
/// directory.
pub const SCAN_ERROR: &str = "Scan Error";

/// List mode without a view: filtered filenames of `dir`, or an empty list
/// if it cannot be read. The scan error is handed to `record`.
pub fn list_documents(
    dir: &Path,
    allowed: &AllowedTypes,
    record: impl FnOnce(&ScanError),
) -> Vec<String> {
    match filter_directory(dir, allowed) {
        Ok(entries) => entries.into_iter().map(|e| e.name).collect(),
        Err(e) => {
            tracing::warn!("{}", e);
            record(&e);
            Vec::new()
        }
    }
}

pub struct DocumentView<'a, S: Store, B: ImageBackend> {
    store: &'a S,
    backend: &'a B,
    allowed: AllowedTypes,
    dir: PathBuf,
    thumb_dir: PathBuf,
    options: SyncOptions,
}

impl<'a, S: Store, B: ImageBackend> DocumentView<'a, S, B> {
    /// Bind a view to `dir`. Thumbnail directory and settings come from
    /// `config`.
    pub fn new(
        store: &'a S,
        backend: &'a B,
        allowed: AllowedTypes,
        dir: impl Into<PathBuf>,
        config: &LibraryConfig,
    ) -> Self {
        Self {
            store,
            backend,
            allowed,
            dir: dir.into(),
            thumb_dir: config.thumbnail_dir.clone(),
            options: SyncOptions {
                thumbnail: config.thumbnails.to_thumbnail_config(),
                image_types: config.thumbnails.image_types(),
            },
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn thumb_dir(&self) -> &Path {
        &self.thumb_dir
    }

    /// Render the directory in `mode`. Only button mode can fail, when the
    /// directory cannot be read.
    pub fn show(&self, mode: Option<DisplayMode>) -> Result<ViewOutput, ScanError> {
        match mode {
            Some(DisplayMode::List) => Ok(ViewOutput::List(self.list())),
            Some(DisplayMode::Button) => {
                let (tiles, report) = self.buttons()?;
                Ok(ViewOutput::Buttons { tiles, report })
            }
            None => {
                tracing::debug!("Unrecognized display mode, showing nothing");
                Ok(ViewOutput::Nothing)
            }
        }
    }

    /// Filtered filenames in listing order. Scan failures are logged
    /// through the store.
    pub fn list(&self) -> Vec<String> {
        list_documents(&self.dir, &self.allowed, |e| {
            self.store.log_error(SCAN_ERROR, &e.to_string())
        })
    }

    /// Synchronize, then build one tile per filtered file.
    pub fn buttons(&self) -> Result<(Vec<Tile>, SyncReport), ScanError> {
        let entries = filter_directory(&self.dir, &self.allowed)?;
        let sync = CatalogSync::new(self.store, self.backend, self.options.clone());
        let report = sync.synchronize(&entries, &self.dir, &self.thumb_dir);

        let tiles = entries
            .iter()
            .map(|entry| Tile {
                name: entry.name.clone(),
                record: self.record(entry),
                thumbnail: report
                    .outcome(&entry.name)
                    .filter(|o| {
                        matches!(
                            o.thumbnail,
                            ThumbnailOutcome::Copied | ThumbnailOutcome::Cropped
                        )
                    })
                    .map(|_| self.thumb_dir.join(&entry.name))
                    .filter(|path| path.is_file()),
            })
            .collect();
        Ok((tiles, report))
    }

    fn record(&self, entry: &DirectoryEntry) -> Option<CatalogRecord> {
        match self.store.select_matching(FILES_TABLE, "file", &entry.name) {
            Ok(rows) => rows.first().and_then(CatalogRecord::from_row),
            Err(e) => {
                tracing::warn!("Cannot read catalog record for {}: {}", entry.name, e);
                None
            }
        }
    }
}
