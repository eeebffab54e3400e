//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Thumbnail** | `resize_exact` + `crop_imm` (cover, centered) |
//! | **Small image** | byte copy, never upscaled |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{CoverCrop, calculate_cover_crop, fits_within};
pub use operations::{CropOutcome, ThumbnailConfig, crop_thumbnail, get_dimensions};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
