//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the thumbnail
//! pipeline needs: identify and thumbnail. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions. The decoder is picked from the file extension.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Scale, crop and encode a square thumbnail to `params.output`.
    ///
    /// Implementations must not leave a readable partial file at the
    /// output path when they fail.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
