//! Image encoding for Pixelift.
//!
//! This module provides functionality for:
//! - Encoding RGBA buffers to WebP (lossy, alpha preserved)
//! - Encoding to PNG (lossless, quality ignored)
//! - Encoding to JPEG (lossy, alpha flattened over a matte)
//!
//! All encoders validate the buffer first and never return partial output.
//!
//! # Examples
//!
//! ```ignore
//! use pixelift_core::encode::{encode, OutputFormat, DEFAULT_JPEG_BACKGROUND};
//!
//! let bytes = encode(&buffer, OutputFormat::Jpeg, 0.9, DEFAULT_JPEG_BACKGROUND).unwrap();
//! println!("Encoded {} bytes", bytes.len());
//! ```

mod jpeg;
mod png;
mod types;
mod webp;

pub use jpeg::{encode_jpeg, DEFAULT_JPEG_BACKGROUND};
pub use png::encode_png;
pub use types::{flatten_alpha, quality_to_percent, EncodeError, OutputFormat};
pub use webp::encode_webp;

use tracing::debug;

use crate::decode::PixelBuffer;

/// Encode `image` in `format`.
///
/// `quality` (in `[0, 1]`) applies to WebP and JPEG and is ignored for PNG.
/// `jpeg_background` is the matte used when flattening alpha for JPEG.
pub fn encode(
    image: &PixelBuffer,
    format: OutputFormat,
    quality: f64,
    jpeg_background: [u8; 3],
) -> Result<Vec<u8>, EncodeError> {
    debug!(
        width = image.width,
        height = image.height,
        %format,
        quality,
        "encoding"
    );

    match format {
        OutputFormat::Webp => encode_webp(image, quality),
        OutputFormat::Png => encode_png(image),
        OutputFormat::Jpeg => encode_jpeg(image, quality, jpeg_background),
    }
}
