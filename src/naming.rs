//! Centralized filename parsing for the `base.extension` convention.
//!
//! Every catalogued file is identified by its full name and classified by
//! the text after its **last** dot. This module provides the single parsing
//! function the filter, the synchronizer and the view all share.
//!
//! - `report.pdf` → base `report`, extension `pdf`
//! - `archive.tar.gz` → base `archive.tar`, extension `gz`
//! - `Scan.PDF` → base `Scan`, extension `PDF` (case is preserved)
//! - `README`, `notes.`, `.hidden` → no usable name
//!
//! Hidden files in general (`.env.pdf`) are the filter's concern, not this
//! parser's.

/// Result of parsing a filename like `report.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Everything before the last dot.
    pub base_name: String,
    /// Everything after the last dot, exactly as on disk.
    pub extension: String,
}

/// Split a filename on its last dot.
///
/// Returns `None` for names without an extension (`README`, `notes.`)
/// and for names whose base would be empty (`.hidden`, `.`, `..`).
pub fn parse_file_name(name: &str) -> Option<ParsedName> {
    let (base, extension) = name.rsplit_once('.')?;
    if base.is_empty() || extension.is_empty() {
        return None;
    }
    Some(ParsedName {
        base_name: base.to_string(),
        extension: extension.to_string(),
    })
}
