//! Horizontal and vertical mirroring.

use serde::{Deserialize, Serialize};

use crate::bitmap::{Bitmap, CHANNELS};

/// Axis to mirror across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    /// Mirror left-right: each row is reversed.
    Horizontal,
    /// Mirror top-bottom: the row order is reversed.
    Vertical,
}

/// Mirror a bitmap across the given axis. Dimensions are unchanged and
/// flipping twice restores the input exactly.
pub fn flip(src: &Bitmap, axis: FlipAxis) -> Bitmap {
    let row_bytes = src.width as usize * CHANNELS;
    let mut pixels = vec![0u8; src.pixels.len()];

    match axis {
        FlipAxis::Horizontal => {
            for y in 0..src.height as usize {
                let row = &src.pixels[y * row_bytes..(y + 1) * row_bytes];
                let out_row = &mut pixels[y * row_bytes..(y + 1) * row_bytes];
                for x in 0..src.width as usize {
                    let mirrored = (src.width as usize - 1 - x) * CHANNELS;
                    out_row[x * CHANNELS..(x + 1) * CHANNELS]
                        .copy_from_slice(&row[mirrored..mirrored + CHANNELS]);
                }
            }
        }
        FlipAxis::Vertical => {
            for y in 0..src.height as usize {
                let mirrored = (src.height as usize - 1 - y) * row_bytes;
                pixels[y * row_bytes..(y + 1) * row_bytes]
                    .copy_from_slice(&src.pixels[mirrored..mirrored + row_bytes]);
            }
        }
    }

    Bitmap::new(src.width, src.height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_bitmap(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height) as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    #[test]
    fn test_horizontal_reverses_rows() {
        let img = indexed_bitmap(4, 2);
        let out = flip(&img, FlipAxis::Horizontal);
        assert_eq!(out.pixel(0, 0), img.pixel(3, 0));
        assert_eq!(out.pixel(3, 0), img.pixel(0, 0));
        assert_eq!(out.pixel(0, 1), img.pixel(3, 1));
    }

    #[test]
    fn test_vertical_reverses_row_order() {
        let img = indexed_bitmap(3, 4);
        let out = flip(&img, FlipAxis::Vertical);
        assert_eq!(out.pixel(0, 0), img.pixel(0, 3));
        assert_eq!(out.pixel(2, 3), img.pixel(2, 0));
        assert_eq!(out.pixel(1, 1), img.pixel(1, 2));
    }

    #[test]
    fn test_double_flip_is_identity() {
        let img = indexed_bitmap(7, 5);
        assert_eq!(flip(&flip(&img, FlipAxis::Horizontal), FlipAxis::Horizontal), img);
        assert_eq!(flip(&flip(&img, FlipAxis::Vertical), FlipAxis::Vertical), img);
    }

    #[test]
    fn test_dimensions_unchanged() {
        let img = indexed_bitmap(9, 3);
        let out = flip(&img, FlipAxis::Horizontal);
        assert_eq!(out.width, 9);
        assert_eq!(out.height, 3);
        assert_eq!(out.pixels.len(), img.pixels.len());
    }

    #[test]
    fn test_both_axes_equal_half_turn() {
        use crate::transform::{rotate, FilterType};

        let img = indexed_bitmap(6, 4);
        let flipped = flip(&flip(&img, FlipAxis::Horizontal), FlipAxis::Vertical);
        let rotated = rotate(&img, 180.0, FilterType::Bilinear);
        assert_eq!(flipped, rotated);
    }

    #[test]
    fn test_single_pixel() {
        let img = Bitmap::filled(1, 1, [9, 8, 7, 255]);
        assert_eq!(flip(&img, FlipAxis::Horizontal), img);
        assert_eq!(flip(&img, FlipAxis::Vertical), img);
    }

    #[test]
    fn test_single_column_horizontal_is_identity() {
        let img = indexed_bitmap(1, 6);
        assert_eq!(flip(&img, FlipAxis::Horizontal), img);
    }
}
