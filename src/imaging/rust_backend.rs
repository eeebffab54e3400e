//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, GIF, PNG, BMP) | `image::ImageReader` (format from extension) |
//! | Identify | `image::image_dimensions` |
//! | Scale | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Square window | `image::DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality) |
//! | Encode → PNG/GIF/BMP | `image::DynamicImage::write_to` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::operations::staging_path;
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Output format from the destination extension. Unknown extensions get JPEG.
fn output_format(path: &Path) -> ImageFormat {
    ImageFormat::from_path(path)
        .ok()
        .filter(|f| matches!(f, ImageFormat::Png | ImageFormat::Gif | ImageFormat::Bmp))
        .unwrap_or(ImageFormat::Jpeg)
}

fn encode(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    quality: u32,
) -> Result<(), BackendError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality as u8);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
        }
        format => {
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut writer, format)
                .map_err(|e| {
                    BackendError::ProcessingFailed(format!("{:?} encode failed: {}", format, e))
                })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Encode into a staging file next to `path`, then rename it into place.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let staging = staging_path(path);
    let result = encode(img, &staging, output_format(path), quality)
        .and_then(|()| fs::rename(&staging, path).map_err(BackendError::Io));
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;

        let scaled = img.resize_exact(
            params.crop.scaled_width,
            params.crop.scaled_height,
            FilterType::Lanczos3,
        );
        let window = scaled.crop_imm(
            params.crop.window_x(),
            params.crop.window_y(),
            params.size,
            params.size,
        );

        save_image(&window, &params.output, params.quality.value())
    }
}
