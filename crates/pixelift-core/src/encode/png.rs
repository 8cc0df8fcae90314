//! Lossless PNG encoding.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::types::validate_buffer;
use super::{EncodeError, OutputFormat};
use crate::decode::PixelBuffer;

/// Encode an RGBA buffer as an 8-bit RGBA PNG.
///
/// The encoding is lossless: decoding the output yields the same pixels.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(image, OutputFormat::Png)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}
