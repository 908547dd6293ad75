//! Decoding arbitrary image bytes into an RGBA bitmap.
//!
//! The container format is sniffed from the bytes themselves, so a session
//! can be opened from any format the `image` crate was compiled with
//! (JPEG, PNG, GIF, WebP here). Everything is normalized to 8-bit RGBA on
//! the way in; the rest of the pipeline never sees another layout.

use thiserror::Error;
use tracing::debug;

use crate::bitmap::Bitmap;

/// Errors that can occur while decoding source bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not in any recognized image format.
    #[error("unrecognized or unsupported image format")]
    InvalidFormat,

    /// The format was recognized but the data is truncated or malformed.
    #[error("failed to decode image: {0}")]
    CorruptedFile(String),
}

/// Decode image bytes into an RGBA bitmap.
///
/// Grayscale, paletted, and RGB inputs are all expanded to RGBA; images
/// without an alpha channel come out fully opaque.
pub fn decode(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let dynamic = image::load_from_memory(bytes).map_err(|e| match e {
        image::ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let rgba = dynamic.to_rgba8();
    let bitmap = Bitmap::from_rgba_image(rgba);

    debug!(
        width = bitmap.width,
        height = bitmap.height,
        bytes = bitmap.byte_size(),
        "decoded image"
    );

    Ok(bitmap)
}
