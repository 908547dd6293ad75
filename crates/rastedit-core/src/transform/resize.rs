//! Resizing with optional fit-inside aspect preservation.
//!
//! The resampling itself is delegated to the `image` crate; what this
//! module owns is the target-dimension arithmetic.

use crate::bitmap::Bitmap;

use super::{FilterType, GeometryError};

/// Fit a requested box inside the source aspect ratio.
///
/// If the requested box is wider than the source aspect, the width is
/// derived from the height; otherwise the height is derived from the
/// width. The result never exceeds the request in either dimension and
/// never collapses below 1x1.
pub fn fit_within(src_w: u32, src_h: u32, req_w: u32, req_h: u32) -> (u32, u32) {
    let aspect = src_w as f64 / src_h as f64;
    if req_w as f64 / req_h as f64 > aspect {
        let w = (req_h as f64 * aspect).round() as u32;
        (w.max(1), req_h)
    } else {
        let h = (req_w as f64 / aspect).round() as u32;
        (req_w, h.max(1))
    }
}

/// Resize a bitmap to the requested dimensions.
///
/// With `preserve_aspect`, the request is interpreted as a bounding box and
/// the output fits inside it at the source's aspect ratio.
pub fn resize(
    src: &Bitmap,
    width: u32,
    height: u32,
    preserve_aspect: bool,
    filter: FilterType,
) -> Result<Bitmap, GeometryError> {
    if width == 0 || height == 0 {
        return Err(GeometryError::ZeroDimension { width, height });
    }

    let (target_w, target_h) = if preserve_aspect {
        fit_within(src.width, src.height, width, height)
    } else {
        (width, height)
    };

    // Fast path: nothing to do.
    if src.width == target_w && src.height == target_h {
        return Ok(src.clone());
    }

    let rgba = src.to_rgba_image().ok_or(GeometryError::InvalidBuffer)?;
    let resized = image::imageops::resize(&rgba, target_w, target_h, filter.to_image_filter());
    Ok(Bitmap::from_rgba_image(resized))
}
