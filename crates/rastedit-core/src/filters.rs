//! Per-pixel channel operations.
//!
//! Every op here is a pure function `[u8; 4] -> [u8; 4]` over one RGBA
//! pixel: outputs are rounded to the nearest integer and clamped to
//! 0..=255, and the alpha channel is never modified. Two families exist:
//!
//! - fixed-strength filter effects selected by [`FilterKind`], and
//! - the composable brightness/contrast/saturation adjustment triple,
//!   applied via [`AdjustmentParams`].
//!
//! The luma coefficients are BT.601 (0.299 / 0.587 / 0.114), matching the
//! editor's established output rather than the BT.709 weights used by
//! most modern pipelines.

use crate::{AdjustmentState, FilterKind};

/// BT.601 luma coefficient for the red channel.
pub const LUMA_R: f32 = 0.299;
/// BT.601 luma coefficient for the green channel.
pub const LUMA_G: f32 = 0.587;
/// BT.601 luma coefficient for the blue channel.
pub const LUMA_B: f32 = 0.114;

/// Fixed gain of the brightness and contrast filter effects.
const BOOST_FACTOR: f32 = 1.5;
/// Fixed gain of the saturate filter effect.
const SATURATE_FACTOR: f32 = 1.8;

/// Round to nearest and clamp into the u8 channel range.
#[inline]
fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// BT.601 luma of a pixel, in the 0..=255 range.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// Replace all color channels with the pixel's luma.
pub fn grayscale(px: [u8; 4]) -> [u8; 4] {
    let g = clamp_channel(luma(px[0], px[1], px[2]));
    [g, g, g, px[3]]
}

/// Warm sepia tone. All matrix terms are non-negative, so only the upper
/// clamp can trigger.
pub fn sepia(px: [u8; 4]) -> [u8; 4] {
    let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
    [
        (0.393 * r + 0.769 * g + 0.189 * b).round().min(255.0) as u8,
        (0.349 * r + 0.686 * g + 0.168 * b).round().min(255.0) as u8,
        (0.272 * r + 0.534 * g + 0.131 * b).round().min(255.0) as u8,
        px[3],
    ]
}

/// Invert each color channel.
pub fn invert(px: [u8; 4]) -> [u8; 4] {
    [255 - px[0], 255 - px[1], 255 - px[2], px[3]]
}

/// Cheap blur approximation: blend each channel 70% toward the pixel's
/// channel average. A per-pixel stand-in for a spatial blur, kept for
/// fidelity with the editor's original look.
pub fn blur(px: [u8; 4]) -> [u8; 4] {
    let avg = (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0;
    [
        clamp_channel(avg * 0.7 + px[0] as f32 * 0.3),
        clamp_channel(avg * 0.7 + px[1] as f32 * 0.3),
        clamp_channel(avg * 0.7 + px[2] as f32 * 0.3),
        px[3],
    ]
}

/// Fixed 1.5x brightness boost.
pub fn brighten(px: [u8; 4]) -> [u8; 4] {
    [
        (px[0] as f32 * BOOST_FACTOR).round().min(255.0) as u8,
        (px[1] as f32 * BOOST_FACTOR).round().min(255.0) as u8,
        (px[2] as f32 * BOOST_FACTOR).round().min(255.0) as u8,
        px[3],
    ]
}

/// Fixed 1.5x contrast boost around mid-gray (128).
pub fn boost_contrast(px: [u8; 4]) -> [u8; 4] {
    [
        clamp_channel((px[0] as f32 - 128.0) * BOOST_FACTOR + 128.0),
        clamp_channel((px[1] as f32 - 128.0) * BOOST_FACTOR + 128.0),
        clamp_channel((px[2] as f32 - 128.0) * BOOST_FACTOR + 128.0),
        px[3],
    ]
}

/// Fixed 1.8x saturation boost around the pixel's luma.
pub fn boost_saturation(px: [u8; 4]) -> [u8; 4] {
    let l = luma(px[0], px[1], px[2]);
    [
        clamp_channel(l + (px[0] as f32 - l) * SATURATE_FACTOR),
        clamp_channel(l + (px[1] as f32 - l) * SATURATE_FACTOR),
        clamp_channel(l + (px[2] as f32 - l) * SATURATE_FACTOR),
        px[3],
    ]
}

/// Look up the per-pixel function for a filter effect.
///
/// `FilterKind::None` has no op; callers skip the pass entirely.
pub fn filter_op(kind: FilterKind) -> Option<fn([u8; 4]) -> [u8; 4]> {
    match kind {
        FilterKind::None => None,
        FilterKind::Grayscale => Some(grayscale),
        FilterKind::Sepia => Some(sepia),
        FilterKind::Invert => Some(invert),
        FilterKind::Blur => Some(blur),
        FilterKind::Brightness => Some(brighten),
        FilterKind::Contrast => Some(boost_contrast),
        FilterKind::Saturate => Some(boost_saturation),
    }
}

/// Contrast factor, with the removable singularity of the 259-formula made
/// explicit so no NaN or infinity ever reaches a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ContrastFactor {
    Finite(f32),
    /// The denominator vanished (contrast fraction == 259/255). Treated as
    /// an infinite factor: channels saturate away from mid-gray.
    Saturating,
}

/// Precomputed parameters for one adjustment pass.
///
/// Built once per run from an [`AdjustmentState`] so the per-pixel hot path
/// does no division. The three stages apply in fixed order (brightness,
/// contrast, saturation), and each stage rounds and clamps to u8 before the
/// next stage reads it. That staged rounding is part of the contract: the
/// saturation luma is computed from the already-quantized post-contrast
/// channels.
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentParams {
    brightness: f32,
    contrast: ContrastFactor,
    saturation: f32,
}

impl AdjustmentParams {
    /// Normalize percent sliders into per-pixel math parameters.
    pub fn new(state: &AdjustmentState) -> Self {
        let c = state.contrast as f32 / 100.0;
        let denominator = 255.0 * (259.0 - c * 255.0);
        let contrast = if denominator.abs() < 1e-3 {
            ContrastFactor::Saturating
        } else {
            ContrastFactor::Finite(259.0 * (c * 255.0 + 255.0) / denominator)
        };
        Self {
            brightness: state.brightness as f32 / 100.0,
            contrast,
            saturation: state.saturation as f32 / 100.0,
        }
    }

    /// Apply the brightness/contrast/saturation triple to one pixel.
    pub fn apply(&self, px: [u8; 4]) -> [u8; 4] {
        // Stage 1: brightness multiply.
        let r = clamp_channel(px[0] as f32 * self.brightness);
        let g = clamp_channel(px[1] as f32 * self.brightness);
        let b = clamp_channel(px[2] as f32 * self.brightness);

        // Stage 2: contrast around mid-gray.
        let (r, g, b) = match self.contrast {
            ContrastFactor::Finite(factor) => (
                clamp_channel(factor * (r as f32 - 128.0) + 128.0),
                clamp_channel(factor * (g as f32 - 128.0) + 128.0),
                clamp_channel(factor * (b as f32 - 128.0) + 128.0),
            ),
            ContrastFactor::Saturating => (
                saturate_extreme(r),
                saturate_extreme(g),
                saturate_extreme(b),
            ),
        };

        // Stage 3: saturation around the post-contrast luma.
        let l = luma(r, g, b);
        [
            clamp_channel(l + (r as f32 - l) * self.saturation),
            clamp_channel(l + (g as f32 - l) * self.saturation),
            clamp_channel(l + (b as f32 - l) * self.saturation),
            px[3],
        ]
    }
}

/// Limit behavior of the contrast formula at its singular point: an
/// infinite factor pushes every channel to the nearest extreme, and exact
/// mid-gray stays put.
#[inline]
fn saturate_extreme(c: u8) -> u8 {
    use std::cmp::Ordering;
    match c.cmp(&128) {
        Ordering::Greater => 255,
        Ordering::Less => 0,
        Ordering::Equal => 128,
    }
}
