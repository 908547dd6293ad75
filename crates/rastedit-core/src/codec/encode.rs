//! Encoding the working bitmap to downloadable bytes.

use std::io::Cursor;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, Frame, ImageEncoder};
use thiserror::Error;
use tracing::debug;

use crate::bitmap::{Bitmap, CHANNELS};

use super::ImageFormat;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match the bitmap dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed { format: &'static str, message: String },
}

/// Encode a bitmap to the requested format.
///
/// `quality` is a normalized 0.0..=1.0 knob (values outside the range are
/// clamped). It only influences JPEG; PNG and WebP are written lossless
/// and GIF quantization is fixed by the encoder.
pub fn encode(bitmap: &Bitmap, format: ImageFormat, quality: f32) -> Result<Vec<u8>, EncodeError> {
    if bitmap.width == 0 || bitmap.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: bitmap.width,
            height: bitmap.height,
        });
    }

    let expected = bitmap.width as usize * bitmap.height as usize * CHANNELS;
    if bitmap.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: bitmap.pixels.len(),
        });
    }

    let quality = quality.clamp(0.0, 1.0);

    let bytes = match format {
        ImageFormat::Jpeg => encode_jpeg(bitmap, quality)?,
        ImageFormat::Png => encode_png(bitmap)?,
        ImageFormat::Webp => encode_webp(bitmap)?,
        ImageFormat::Gif => encode_gif(bitmap)?,
    };

    debug!(
        format = format.extension(),
        quality,
        input_bytes = bitmap.byte_size(),
        output_bytes = bytes.len(),
        "encoded image"
    );

    Ok(bytes)
}

/// JPEG with the normalized quality mapped onto the encoder's 1-100 scale.
/// JPEG carries no alpha, so the channel is dropped.
fn encode_jpeg(bitmap: &Bitmap, quality: f32) -> Result<Vec<u8>, EncodeError> {
    let jpeg_quality = ((quality * 100.0).round() as u8).clamp(1, 100);

    let mut rgb = Vec::with_capacity(bitmap.pixel_count() as usize * 3);
    for px in bitmap.pixels.chunks_exact(CHANNELS) {
        rgb.extend_from_slice(&px[..3]);
    }

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality);
    encoder
        .write_image(&rgb, bitmap.width, bitmap.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = PngEncoder::new(&mut buffer);
    encoder
        .write_image(
            &bitmap.pixels,
            bitmap.width,
            bitmap.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed {
            format: "PNG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

fn encode_webp(bitmap: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = WebPEncoder::new_lossless(&mut buffer);
    encoder
        .write_image(
            &bitmap.pixels,
            bitmap.width,
            bitmap.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed {
            format: "WebP",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

fn encode_gif(bitmap: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    let rgba = bitmap
        .to_rgba_image()
        .ok_or(EncodeError::InvalidPixelData {
            expected: bitmap.width as usize * bitmap.height as usize * CHANNELS,
            actual: bitmap.pixels.len(),
        })?;

    let mut bytes = Vec::new();
    let mut encoder = GifEncoder::new(&mut bytes);
    encoder
        .encode_frame(Frame::new(rgba))
        .map_err(|e| EncodeError::EncodingFailed {
            format: "GIF",
            message: e.to_string(),
        })?;
    drop(encoder);

    Ok(bytes)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
