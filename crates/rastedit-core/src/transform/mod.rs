//! Geometric transforms: crop, resize, rotation, and flip.
//!
//! Every operation here takes a bitmap and produces a new-shaped bitmap;
//! nothing mutates its input. In a session these apply to the working
//! image only; the original is never reshaped.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, row-major
//! - Crop coordinates are in pixels
//! - Rotation angles are in degrees, positive = clockwise

mod crop;
mod flip;
mod resize;
mod rotation;

pub use crop::crop;
pub use flip::{flip, FlipAxis};
pub use resize::{fit_within, resize};
pub use rotation::rotate;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from geometric operations. The input bitmap is always left
/// untouched when one of these is returned.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The crop origin lies outside the image, so the clamped region is
    /// empty.
    #[error("crop region {width}x{height} at ({x}, {y}) is empty after clamping to image bounds")]
    EmptyCrop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// A resize target dimension was zero.
    #[error("resize dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    /// The pixel buffer did not match the bitmap's dimensions.
    #[error("pixel buffer does not match bitmap dimensions")]
    InvalidBuffer,
}

/// Resampling filter for resize and arbitrary-angle rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}
