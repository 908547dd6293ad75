//! Rastedit Core - Incremental image editing pipeline
//!
//! This crate provides the in-memory editing engine for Rastedit: per-pixel
//! filters and adjustments, an incremental chunked processor that never
//! blocks a host event loop, geometric transforms, and byte codecs.
//!
//! The central type is [`EditSession`], which holds an immutable original
//! bitmap and a mutable working bitmap. Every filter or adjustment change
//! is realized by replaying the edit stack from the original, so repeated
//! slider moves never accumulate rounding error.

pub mod bitmap;
pub mod codec;
pub mod debounce;
pub mod filters;
pub mod processor;
pub mod session;
pub mod transform;

pub use bitmap::{Bitmap, ImageInfo};
pub use codec::{decode, encode, DecodeError, EncodeError, ImageFormat};
pub use debounce::Debouncer;
pub use processor::{ChunkedRun, NullSink, ProgressSink, DEFAULT_CHUNK_PIXELS};
pub use session::{EditSession, ReplayRun, SessionState};
pub use transform::{FilterType, FlipAxis, GeometryError};

/// Per-pixel filter effects selectable in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FilterKind {
    /// No filter; the working image shows only the current adjustments.
    #[default]
    None,
    /// BT.601 luma grayscale.
    Grayscale,
    /// Warm sepia tone matrix.
    Sepia,
    /// Per-channel inversion.
    Invert,
    /// Cheap per-pixel blend toward the local luma average (not a spatial blur).
    Blur,
    /// Fixed 1.5x brightness boost.
    Brightness,
    /// Fixed 1.5x contrast boost around mid-gray.
    Contrast,
    /// Fixed 1.8x saturation boost around luma.
    Saturate,
}

/// Slider adjustments, as percents with 100 meaning "unchanged".
///
/// Values are deliberately not validated; negative or extreme percents are
/// passed through to the channel math, which clamps every output to 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AdjustmentState {
    /// Brightness percent (default 100).
    pub brightness: i32,
    /// Contrast percent (default 100).
    pub contrast: i32,
    /// Saturation percent (default 100).
    pub saturation: i32,
}

impl Default for AdjustmentState {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
        }
    }
}

impl AdjustmentState {
    /// Create a new AdjustmentState with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all sliders are at their neutral position.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
