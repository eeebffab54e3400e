//! CLI output formatting.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! notes.txt
//! photo.jpg
//! ```
//!
//! ## Button (sync)
//!
//! ```text
//! 001 notes.txt
//!     Catalog: inserted
//!     Size: 5 b
//!     Uploaded: 2026-10-17 09:04:31 UTC
//! 002 photo.jpg
//!     Thumbnail: cropped → docs/crop/photo.jpg
//!     Catalog: already cataloged
//!     Size: 48.2 kb
//!     Uploaded: 2026-10-16 18:12:09 UTC
//!
//! Synchronized 2 files: 1 inserted, 1 already cataloged, 1 thumbnail, 0 failures
//! ```
//!
//! # Architecture
//!
//! Each mode has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::catalog::{CatalogOutcome, FileOutcome, SyncReport, ThumbnailOutcome};
use crate::view::Tile;
use chrono::DateTime;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// Unix seconds as a UTC timestamp, or the raw number if out of range.
fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn thumbnail_status(outcome: &ThumbnailOutcome) -> Option<String> {
    match outcome {
        ThumbnailOutcome::NotImage => None,
        ThumbnailOutcome::Copied => Some("copied".to_string()),
        ThumbnailOutcome::Cropped => Some("cropped".to_string()),
        ThumbnailOutcome::Failed(e) => Some(format!("failed ({})", e)),
    }
}

fn catalog_status(outcome: &CatalogOutcome) -> String {
    match outcome {
        CatalogOutcome::Inserted => "inserted".to_string(),
        CatalogOutcome::AlreadyCataloged => "already cataloged".to_string(),
        CatalogOutcome::Failed(e) => format!("failed ({})", e),
    }
}

// ============================================================================
// List mode
// ============================================================================

pub fn format_list(names: &[String]) -> Vec<String> {
    names.to_vec()
}

pub fn print_list(names: &[String]) {
    for line in format_list(names) {
        println!("{}", line);
    }
}

// ============================================================================
// Button mode
// ============================================================================

/// One summary line for a pass.
pub fn format_summary(report: &SyncReport) -> String {
    format!(
        "Synchronized {}: {} inserted, {} already cataloged, {}, {}",
        plural(report.files.len(), "file"),
        report.inserted(),
        report.already_cataloged(),
        plural(report.thumbnails_written(), "thumbnail"),
        plural(report.failures(), "failure"),
    )
}

/// Format button mode output: every tile with what the pass did to it,
/// then the summary.
pub fn format_buttons(tiles: &[Tile], report: &SyncReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, tile) in tiles.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), tile.name));
        let outcome: Option<&FileOutcome> = report.outcome(&tile.name);

        if let Some(status) = outcome.and_then(|o| thumbnail_status(&o.thumbnail)) {
            match &tile.thumbnail {
                Some(path) => lines.push(format!("    Thumbnail: {} → {}", status, path.display())),
                None => lines.push(format!("    Thumbnail: {}", status)),
            }
        }
        if let Some(o) = outcome {
            lines.push(format!("    Catalog: {}", catalog_status(&o.catalog)));
        }

        match &tile.record {
            Some(record) => {
                lines.push(format!("    Size: {}", record.size));
                lines.push(format!(
                    "    Uploaded: {}",
                    format_timestamp(record.uploaded_at)
                ));
            }
            None => lines.push("    Not cataloged".to_string()),
        }
    }

    if !tiles.is_empty() {
        lines.push(String::new());
    }
    lines.push(format_summary(report));
    lines
}

pub fn print_buttons(tiles: &[Tile], report: &SyncReport) {
    for line in format_buttons(tiles, report) {
        println!("{}", line);
    }
}

/// Tiles as pretty JSON, for front ends that render buttons themselves.
pub fn format_tiles_json(tiles: &[Tile]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tiles)
}
