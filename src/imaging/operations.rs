//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{calculate_cover_crop, fits_within};
use super::params::{Quality, ThumbnailParams};
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Edge of the square thumbnail in pixels.
    pub size: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: 100,
            quality: Quality::default(),
        }
    }
}

/// What [`crop_thumbnail`] did to produce the destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    /// Source already fit inside the square; bytes were copied verbatim.
    Copied,
    /// Source was scaled and center-cropped.
    Cropped,
}

/// Sibling path a file is written to before being renamed into place.
///
/// `crop/photo.jpg` → `crop/.photo.jpg.part`
pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}

/// Copy a file through a staging file so the destination is never partial.
fn copy_verbatim(source: &Path, destination: &Path) -> Result<()> {
    let staging = staging_path(destination);
    let result = fs::copy(source, &staging)
        .and_then(|_| fs::rename(&staging, destination))
        .map_err(BackendError::Io);
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

/// Plan a thumbnail operation without executing it.
///
/// Returns `None` when the source already fits and should be copied.
pub fn plan_thumbnail(
    source: &Path,
    output_path: &Path,
    dimensions: (u32, u32),
    config: &ThumbnailConfig,
) -> Option<ThumbnailParams> {
    if fits_within(dimensions, config.size) {
        return None;
    }
    Some(ThumbnailParams {
        source: source.to_path_buf(),
        output: output_path.to_path_buf(),
        size: config.size,
        crop: calculate_cover_crop(dimensions, config.size),
        quality: config.quality,
    })
}

/// Create a square thumbnail of `source` at `destination`.
///
/// Images that already fit are copied byte-for-byte (never upscaled);
/// larger ones are scaled to cover the square and center-cropped.
pub fn crop_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    destination: &Path,
    config: &ThumbnailConfig,
) -> Result<CropOutcome> {
    let dimensions = get_dimensions(backend, source)?;

    match plan_thumbnail(source, destination, dimensions, config) {
        None => {
            copy_verbatim(source, destination)?;
            Ok(CropOutcome::Copied)
        }
        Some(params) => {
            backend.thumbnail(&params)?;
            Ok(CropOutcome::Cropped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::rust_backend::RustBackend;
    use crate::test_helpers::{create_test_jpeg, read_dimensions};

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::with_dimensions(&[("test.jpg", 1920, 1080)]);

        let dims = get_dimensions(&backend, Path::new("/test.jpg")).unwrap();
        assert_eq!(dims, (1920, 1080));
    }

    #[test]
    fn staging_path_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("docs/crop/photo.jpg")),
            PathBuf::from("docs/crop/.photo.jpg.part")
        );
    }

    #[test]
    fn plan_thumbnail_none_for_small_image() {
        let plan = plan_thumbnail(
            Path::new("/a.jpg"),
            Path::new("/crop/a.jpg"),
            (50, 50),
            &ThumbnailConfig::default(),
        );
        assert!(plan.is_none());
    }

    #[test]
    fn plan_thumbnail_calculates_cover_geometry() {
        let params = plan_thumbnail(
            Path::new("/a.jpg"),
            Path::new("/crop/a.jpg"),
            (400, 200),
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(params.size, 100);
        assert_eq!(params.crop.scaled_width, 200);
        assert_eq!(params.crop.scaled_height, 100);
        assert_eq!(params.crop.offset_x, -50);
    }

    #[test]
    fn plan_thumbnail_respects_configured_size() {
        let config = ThumbnailConfig {
            size: 64,
            quality: Quality::new(70),
        };
        let params =
            plan_thumbnail(Path::new("/a.jpg"), Path::new("/b.jpg"), (64, 128), &config).unwrap();

        assert_eq!(params.size, 64);
        assert_eq!(params.crop.scaled_width, 64);
        assert_eq!(params.crop.scaled_height, 128);
        assert_eq!(params.quality.value(), 70);
    }

    #[test]
    fn crop_large_image_uses_backend() {
        let backend = MockBackend::with_dimensions(&[("big.jpg", 400, 200)]);

        let outcome = crop_thumbnail(
            &backend,
            Path::new("/docs/big.jpg"),
            Path::new("/docs/crop/big.jpg"),
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome, CropOutcome::Cropped);
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[1],
            RecordedOp::Thumbnail { output, size: 100, .. } if output == "/docs/crop/big.jpg"
        ));
    }

    #[test]
    fn crop_unreadable_image_propagates_error() {
        let backend = MockBackend::new();

        let result = crop_thumbnail(
            &backend,
            Path::new("/docs/corrupt.png"),
            Path::new("/docs/crop/corrupt.png"),
            &ThumbnailConfig::default(),
        );

        assert!(result.is_err());
        assert_eq!(backend.thumbnail_sources().len(), 0);
    }

    #[test]
    fn small_image_is_copied_byte_for_byte() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("small.jpg");
        create_test_jpeg(&source, 50, 50);
        let destination = tmp.path().join("small-copy.jpg");

        let outcome = crop_thumbnail(
            &RustBackend::new(),
            &source,
            &destination,
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome, CropOutcome::Copied);
        assert_eq!(fs::read(&source).unwrap(), fs::read(&destination).unwrap());
        assert!(!staging_path(&destination).exists());
    }

    #[test]
    fn large_image_is_cropped_to_square() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        create_test_jpeg(&source, 400, 200);
        let destination = tmp.path().join("photo-thumb.jpg");

        let outcome = crop_thumbnail(
            &RustBackend::new(),
            &source,
            &destination,
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome, CropOutcome::Cropped);
        assert_eq!(read_dimensions(&destination), (100, 100));
    }

    #[test]
    fn copy_into_missing_directory_fails_cleanly() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("small.jpg");
        create_test_jpeg(&source, 20, 20);
        let destination = tmp.path().join("nowhere").join("small.jpg");

        let result = crop_thumbnail(
            &RustBackend::new(),
            &source,
            &destination,
            &ThumbnailConfig::default(),
        );

        assert!(matches!(result, Err(BackendError::Io(_))));
        assert!(!destination.exists());
    }
}
