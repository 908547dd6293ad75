//! Pixel-coordinate cropping.

use crate::bitmap::{Bitmap, CHANNELS};

use super::GeometryError;

/// Extract the region `[x, min(x+w, srcW)) x [y, min(y+h, srcH))` into a
/// new bitmap.
///
/// Regions reaching past the right or bottom edge are clamped rather than
/// rejected; a 100x100 request at (5, 5) on a 10x10 image yields 5x5. Only
/// a region that is empty after clamping (origin outside the image, or a
/// zero requested extent) is an error.
pub fn crop(src: &Bitmap, x: u32, y: u32, width: u32, height: u32) -> Result<Bitmap, GeometryError> {
    let right = x.saturating_add(width).min(src.width);
    let bottom = y.saturating_add(height).min(src.height);

    if x >= right || y >= bottom {
        return Err(GeometryError::EmptyCrop {
            x,
            y,
            width,
            height,
        });
    }

    let out_w = right - x;
    let out_h = bottom - y;
    let row_bytes = out_w as usize * CHANNELS;
    let mut pixels = vec![0u8; out_h as usize * row_bytes];

    for row in 0..out_h as usize {
        let src_start = ((y as usize + row) * src.width as usize + x as usize) * CHANNELS;
        let dst_start = row * row_bytes;
        pixels[dst_start..dst_start + row_bytes]
            .copy_from_slice(&src.pixels[src_start..src_start + row_bytes]);
    }

    Ok(Bitmap::new(out_w, out_h, pixels))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (4u32..=64, 4u32..=64)
    }

    fn create_test_bitmap(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height) as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    proptest! {
        /// Successful crops never exceed the source dimensions.
        #[test]
        fn prop_output_bounded_by_input(
            (width, height) in dimensions_strategy(),
            (x, y, w, h) in (0u32..=80, 0u32..=80, 1u32..=80, 1u32..=80),
        ) {
            let img = create_test_bitmap(width, height);
            if let Ok(result) = crop(&img, x, y, w, h) {
                prop_assert!(result.width <= width);
                prop_assert!(result.height <= height);
                prop_assert!(result.width >= 1);
                prop_assert!(result.height >= 1);
            }
        }

        /// Pixel buffer length always matches the output dimensions.
        #[test]
        fn prop_pixel_data_matches_dimensions(
            (width, height) in dimensions_strategy(),
            (x, y, w, h) in (0u32..=80, 0u32..=80, 1u32..=80, 1u32..=80),
        ) {
            let img = create_test_bitmap(width, height);
            if let Ok(result) = crop(&img, x, y, w, h) {
                prop_assert_eq!(
                    result.pixels.len(),
                    result.width as usize * result.height as usize * CHANNELS
                );
            }
        }

        /// An in-bounds origin always succeeds (extent clamps, never errors).
        #[test]
        fn prop_inbounds_origin_succeeds(
            (width, height) in dimensions_strategy(),
            (w, h) in (1u32..=200, 1u32..=200),
        ) {
            let img = create_test_bitmap(width, height);
            let result = crop(&img, width / 2, height / 2, w, h);
            prop_assert!(result.is_ok());
        }

        /// Cropping is deterministic.
        #[test]
        fn prop_crop_is_deterministic(
            (width, height) in dimensions_strategy(),
            (x, y, w, h) in (0u32..=32, 0u32..=32, 1u32..=32, 1u32..=32),
        ) {
            let img = create_test_bitmap(width, height);
            let a = crop(&img, x, y, w, h);
            let b = crop(&img, x, y, w, h);
            match (a, b) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "determinism violated"),
            }
        }

        /// Every cropped pixel matches the source pixel it came from.
        #[test]
        fn prop_pixels_preserved(
            (width, height) in (8u32..=32, 8u32..=32),
            (x, y, w, h) in (0u32..=4, 0u32..=4, 1u32..=8, 1u32..=8),
        ) {
            let img = create_test_bitmap(width, height);
            let result = crop(&img, x, y, w, h).unwrap();
            for dy in 0..result.height {
                for dx in 0..result.width {
                    prop_assert_eq!(result.pixel(dx, dy), img.pixel(x + dx, y + dy));
                }
            }
        }
    }
}
