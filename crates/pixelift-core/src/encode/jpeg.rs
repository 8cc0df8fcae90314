//! JPEG encoding.
//!
//! JPEG has no alpha channel. Pixels are composited over an opaque matte
//! before encoding, so a transparent pixel comes out as the matte color.
//! The default matte is black, which is what a browser canvas produces for
//! transparent pixels.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::types::{flatten_alpha, quality_to_percent, validate_buffer};
use super::{EncodeError, OutputFormat};
use crate::decode::PixelBuffer;

/// Matte used when flattening alpha unless configured otherwise.
pub const DEFAULT_JPEG_BACKGROUND: [u8; 3] = [0, 0, 0];

/// Encode an RGBA buffer as JPEG.
///
/// # Arguments
///
/// * `image` - Source pixels
/// * `quality` - Quality in `[0, 1]`, mapped to the encoder's 1-100 scale
/// * `background` - Matte color for non-opaque pixels
pub fn encode_jpeg(
    image: &PixelBuffer,
    quality: f64,
    background: [u8; 3],
) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(image, OutputFormat::Jpeg)?;

    let rgb = flatten_alpha(&image.pixels, background);
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality_to_percent(quality))
        .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any valid buffer at any quality encodes to a framed JPEG.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            (width, height) in (1u32..=40, 1u32..=40),
            quality in 0.0f64..=1.0,
            alpha in any::<u8>(),
        ) {
            let img = PixelBuffer::filled(width, height, [90, 180, 45, alpha]);
            let bytes = encode_jpeg(&img, quality, DEFAULT_JPEG_BACKGROUND).unwrap();

            prop_assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
            let len = bytes.len();
            prop_assert_eq!(&bytes[len - 2..], &[0xFF, 0xD9]);
        }

        /// Property: same input always produces same output.
        #[test]
        fn prop_deterministic_output(
            (width, height) in (1u32..=20, 1u32..=20),
            quality in 0.0f64..=1.0,
        ) {
            let img = PixelBuffer::filled(width, height, [100, 100, 100, 255]);
            let a = encode_jpeg(&img, quality, DEFAULT_JPEG_BACKGROUND).unwrap();
            let b = encode_jpeg(&img, quality, DEFAULT_JPEG_BACKGROUND).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
