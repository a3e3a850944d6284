//! Decoding the user-selected image file into a source bitmap.
//!
//! The host hands over the raw file bytes after the asynchronous file read
//! completes; decoding itself is synchronous. The decoded bitmap is
//! displayed at its natural size until the host layout reports the rendered
//! size via [`Bitmap::with_displayed_size`].

use thiserror::Error;

use crate::bitmap::Bitmap;

/// Errors that can occur while decoding a source image.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Decode image bytes into a [`Bitmap`].
///
/// Supports the containers enabled on the `image` crate (JPEG and PNG).
/// Pixel data is converted to RGB; alpha, if present, is dropped.
pub fn decode_bitmap(bytes: &[u8]) -> Result<Bitmap, DecodeError> {
    let decoded = image::load_from_memory(bytes).map_err(|err| match err {
        image::ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    Ok(Bitmap::from_rgb_image(decoded.to_rgb8()))
}
