//! Pure calculation functions for thumbnail geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// How a source image is scaled and positioned to cover a square canvas.
///
/// The scaled image is at least `size` on both axes. Offsets are the
/// (non-positive) position of the scaled image's top-left corner relative
/// to the canvas, so the oversized axis is centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverCrop {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub offset_x: i64,
    pub offset_y: i64,
}

impl CoverCrop {
    /// Left edge of the square window inside the scaled image.
    pub fn window_x(&self) -> u32 {
        (-self.offset_x).max(0) as u32
    }

    /// Top edge of the square window inside the scaled image.
    pub fn window_y(&self) -> u32 {
        (-self.offset_y).max(0) as u32
    }
}

/// Whether an image already fits inside a `size × size` square.
///
/// Such images are copied instead of transformed; they are never upscaled.
pub fn fits_within(source: (u32, u32), size: u32) -> bool {
    source.0 <= size && source.1 <= size
}

/// Calculate the "cover" geometry for a square thumbnail.
///
/// Wider-than-tall sources are scaled so their height matches `size`;
/// taller sources so their width does. The other axis overflows and is
/// centered.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `size` - Edge of the square thumbnail
///
/// ```
/// # use doclib::imaging::calculate_cover_crop;
/// let crop = calculate_cover_crop((400, 200), 100);
/// assert_eq!((crop.scaled_width, crop.scaled_height), (200, 100));
/// assert_eq!((crop.offset_x, crop.offset_y), (-50, 0));
/// ```
pub fn calculate_cover_crop(source: (u32, u32), size: u32) -> CoverCrop {
    let (src_w, src_h) = source;
    let (src_w, src_h) = (src_w.max(1) as f64, src_h.max(1) as f64);
    let target = size as f64;

    let (scaled_w, scaled_h) = if src_w / src_h >= 1.0 {
        (src_w / (src_h / target), target)
    } else {
        (target, src_h / (src_w / target))
    };
    let scaled_width = (scaled_w.round() as u32).max(size);
    let scaled_height = (scaled_h.round() as u32).max(size);

    CoverCrop {
        scaled_width,
        scaled_height,
        offset_x: -((scaled_width - size) as i64 / 2),
        offset_y: -((scaled_height - size) as i64 / 2),
    }
}
