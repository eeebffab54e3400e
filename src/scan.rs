//! Directory scanning and type filtering.
//!
//! First step of every pass. Lists the direct children of the documents
//! directory and keeps the regular files whose extension the caller allows.
//!
//! ## Filtering Rules
//!
//! ```text
//! docs/
//! ├── a.pdf        kept      (extension "pdf" allowed)
//! ├── b.PDF        dropped   (matching is case-sensitive)
//! ├── c            dropped   (no extension)
//! ├── .hidden      dropped   (hidden)
//! ├── old.pdf/     dropped   (directory, whatever its name)
//! └── crop/        dropped   (directory)
//! ```
//!
//! Entries are returned sorted by filename. Nothing dropped is an error;
//! only an unreadable directory is.
//!
//! Hidden files are never listed, even when their extension is allowed:
//! `.pdf` and `.draft.pdf` are dropped, although a plain last-dot split
//! would read `.pdf` as extension `pdf` with an empty base name.

use crate::naming::parse_file_name;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Extensions a pass keeps, matched case-sensitively.
pub type AllowedTypes = BTreeSet<String>;

/// Build an [`AllowedTypes`] set from string slices.
pub fn allowed_types<I, S>(types: I) -> AllowedTypes
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    types.into_iter().map(|t| t.as_ref().to_string()).collect()
}

/// A regular file that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Full filename including extension; the catalog key.
    pub name: String,
    pub base_name: String,
    pub extension: String,
}

impl DirectoryEntry {
    /// Build an entry from a filename, or `None` if it has no extension.
    pub fn from_name(name: &str) -> Option<Self> {
        let parsed = parse_file_name(name)?;
        Some(Self {
            name: name.to_string(),
            base_name: parsed.base_name,
            extension: parsed.extension,
        })
    }
}

/// List `dir` and keep regular files whose extension is in `allowed`.
pub fn filter_directory(
    dir: &Path,
    allowed: &AllowedTypes,
) -> Result<Vec<DirectoryEntry>, ScanError> {
    let unreadable = |source| ScanError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(dir).map_err(unreadable)?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut entries = Vec::new();
    for item in walker {
        let item = match item {
            Ok(item) => item,
            Err(e) if e.depth() == 0 => return Err(unreadable(e.into())),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        if !item.file_type().is_file() {
            continue;
        }
        let Some(name) = item.file_name().to_str() else {
            tracing::debug!("Skipping non UTF-8 filename {:?}", item.file_name());
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let Some(entry) = DirectoryEntry::from_name(name) else {
            continue;
        };
        if allowed.contains(&entry.extension) {
            entries.push(entry);
        }
    }

    tracing::debug!(
        "Filtered {} to {} entries",
        dir.display(),
        entries.len()
    );
    Ok(entries)
}
