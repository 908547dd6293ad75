//! Byte codecs: decoding source files into bitmaps and re-encoding the
//! working image for download.
//!
//! Decoding is format-sniffing; the caller never names the input format.
//! Encoding always targets an explicit [`ImageFormat`] with a normalized
//! 0.0..=1.0 quality knob, so the same call serves the compress, convert,
//! and export surfaces with different presets.

mod decode;
mod encode;

pub use decode::{decode, DecodeError};
pub use encode::{encode, EncodeError};

use serde::{Deserialize, Serialize};

/// Quality preset for size-focused re-encoding.
pub const QUALITY_COMPRESS: f32 = 0.7;
/// Quality preset for format conversion.
pub const QUALITY_CONVERT: f32 = 0.9;
/// Quality preset for final export.
pub const QUALITY_EXPORT: f32 = 0.95;

/// Output formats for re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// Lossy JPEG; alpha is dropped.
    Jpeg,
    /// Lossless PNG with alpha.
    Png,
    /// Lossless WebP with alpha (the quality knob is ignored).
    Webp,
    /// GIF, quantized to 256 colors by the encoder.
    Gif,
}

impl ImageFormat {
    /// File extension for download names, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
            ImageFormat::Gif => "gif",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::Webp.extension(), "webp");
        assert_eq!(ImageFormat::Gif.extension(), "gif");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Gif.mime_type(), "image/gif");
    }

    #[test]
    fn test_quality_presets_ordered() {
        assert!(QUALITY_COMPRESS < QUALITY_CONVERT);
        assert!(QUALITY_CONVERT < QUALITY_EXPORT);
    }
}
