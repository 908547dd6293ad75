//! Image rotation.
//!
//! Exact multiples of 90 degrees are pure index remaps: no resampling, no
//! pixel loss, and rotating by 90 then -90 restores the input byte for
//! byte. Any other angle is best-effort: the output keeps the source
//! bounding box, content is inverse-mapped around the center with the
//! requested filter, and corners that swing outside the box clip away.
//!
//! Positive angles rotate clockwise (top-left origin, y down).

use crate::bitmap::{Bitmap, CHANNELS};

use super::FilterType;

/// Tolerance when snapping an angle to an exact 0/90/180/270 remap.
const ANGLE_EPSILON: f64 = 0.001;

/// Rotate a bitmap by an angle in degrees.
pub fn rotate(src: &Bitmap, angle_degrees: f64, filter: FilterType) -> Bitmap {
    let normalized = ((angle_degrees % 360.0) + 360.0) % 360.0;

    if normalized.abs() < ANGLE_EPSILON || (360.0 - normalized).abs() < ANGLE_EPSILON {
        return src.clone();
    }
    if (normalized - 90.0).abs() < ANGLE_EPSILON {
        return rotate_90_cw(src);
    }
    if (normalized - 180.0).abs() < ANGLE_EPSILON {
        return rotate_180(src);
    }
    if (normalized - 270.0).abs() < ANGLE_EPSILON {
        return rotate_90_ccw(src);
    }

    rotate_arbitrary(src, normalized, filter)
}

/// Lossless clockwise quarter turn; output dimensions swap.
fn rotate_90_cw(src: &Bitmap) -> Bitmap {
    let (out_w, out_h) = (src.height, src.width);
    let mut out = Bitmap::filled(out_w, out_h, [0, 0, 0, 0]);
    for dy in 0..out_h {
        for dx in 0..out_w {
            out.set_pixel(dx, dy, src.pixel(dy, src.height - 1 - dx));
        }
    }
    out
}

/// Lossless counter-clockwise quarter turn; output dimensions swap.
fn rotate_90_ccw(src: &Bitmap) -> Bitmap {
    let (out_w, out_h) = (src.height, src.width);
    let mut out = Bitmap::filled(out_w, out_h, [0, 0, 0, 0]);
    for dy in 0..out_h {
        for dx in 0..out_w {
            out.set_pixel(dx, dy, src.pixel(src.width - 1 - dy, dx));
        }
    }
    out
}

/// Lossless half turn; dimensions unchanged.
fn rotate_180(src: &Bitmap) -> Bitmap {
    let mut out = Bitmap::filled(src.width, src.height, [0, 0, 0, 0]);
    for dy in 0..src.height {
        for dx in 0..src.width {
            out.set_pixel(dx, dy, src.pixel(src.width - 1 - dx, src.height - 1 - dy));
        }
    }
    out
}

/// Best-effort arbitrary-angle rotation, bounding box preserved.
fn rotate_arbitrary(src: &Bitmap, angle_degrees: f64, filter: FilterType) -> Bitmap {
    let angle_rad = angle_degrees.to_radians();
    let (sin, cos) = angle_rad.sin_cos();

    let cx = src.width as f64 / 2.0;
    let cy = src.height as f64 / 2.0;

    let mut out = Bitmap::filled(src.width, src.height, [0, 0, 0, 0]);
    for dst_y in 0..src.height {
        for dst_x in 0..src.width {
            let dx = dst_x as f64 - cx;
            let dy = dst_y as f64 - cy;

            // Inverse mapping: rotate the destination point back by -angle
            // (clockwise forward, so the inverse is counter-clockwise).
            let src_x = dx * cos + dy * sin + cx;
            let src_y = -dx * sin + dy * cos + cy;

            let pixel = match filter {
                FilterType::Nearest => sample_nearest(src, src_x, src_y),
                FilterType::Bilinear | FilterType::Lanczos3 => sample_bilinear(src, src_x, src_y),
            };
            out.set_pixel(dst_x, dst_y, pixel);
        }
    }
    out
}

/// Nearest-neighbor sample; transparent black outside the source.
fn sample_nearest(src: &Bitmap, x: f64, y: f64) -> [u8; 4] {
    let px = x.round();
    let py = y.round();
    if px < 0.0 || py < 0.0 || px >= src.width as f64 || py >= src.height as f64 {
        return [0, 0, 0, 0];
    }
    src.pixel(px as u32, py as u32)
}

/// Bilinear sample over the 4 nearest pixels; transparent black outside
/// the source.
fn sample_bilinear(src: &Bitmap, x: f64, y: f64) -> [u8; 4] {
    if x < 0.0 || y < 0.0 || x > (src.width - 1) as f64 || y > (src.height - 1) as f64 {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(src.width - 1);
    let y1 = (y0 + 1).min(src.height - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = src.pixel(x0, y0);
    let p10 = src.pixel(x1, y0);
    let p01 = src.pixel(x0, y1);
    let p11 = src.pixel(x1, y1);

    let mut result = [0u8; 4];
    for i in 0..CHANNELS {
        let v = p00[i] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f64 * fx * (1.0 - fy)
            + p01[i] as f64 * (1.0 - fx) * fy
            + p11[i] as f64 * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}


// ============================================================================
// Property-Based Tests
// ============================================================================
