//! Append-only flat file for errors that cannot reach the database.
//!
//! Used when the store cannot be opened at all, or when writing to its
//! `log` table fails too. One line per error:
//!
//! ```text
//! Date: Oct 17 2026 - 9:04:31 ---- Error: unable to open database file
//! ```

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line, creating the file and its directory if needed.
    pub fn append(&self, message: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let date = Local::now().format("%b %-d %Y - %-H:%M:%S").to_string();
        writeln!(file, "{}", format_line(&date, message))
    }

    /// Append, reporting through tracing if even the flat file is unwritable.
    pub fn record(&self, message: &str) {
        if let Err(e) = self.append(message) {
            tracing::error!(
                "Could not write error log {}: {} (original error: {})",
                self.path.display(),
                e,
                message
            );
        }
    }
}

fn format_line(date: &str, message: &str) -> String {
    // Keep one entry per line even for multi-line driver messages
    let message = message.replace(['\r', '\n'], " ");
    format!("Date: {} ---- Error: {}", date, message)
}
