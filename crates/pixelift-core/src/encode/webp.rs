//! WebP encoding.
//!
//! With the `lossy-webp` feature (default) output is lossy VP8 through libwebp
//! at the requested quality, alpha preserved. Without it, output falls back to
//! the pure-Rust lossless encoder and quality is ignored.

use super::types::validate_buffer;
use super::{EncodeError, OutputFormat};
use crate::decode::PixelBuffer;

/// Encode an RGBA buffer as WebP.
///
/// `quality` is in `[0, 1]` and goes through [`quality_to_percent`] like JPEG,
/// so values outside are clamped.
///
/// [`quality_to_percent`]: super::quality_to_percent
pub fn encode_webp(image: &PixelBuffer, quality: f64) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(image, OutputFormat::Webp)?;
    encode_rgba(image, quality)
}

#[cfg(feature = "lossy-webp")]
fn encode_rgba(image: &PixelBuffer, quality: f64) -> Result<Vec<u8>, EncodeError> {
    use super::types::quality_to_percent;

    let encoder = ::webp::Encoder::from_rgba(&image.pixels, image.width, image.height);
    let memory = encoder
        .encode_simple(false, quality_to_percent(quality) as f32)
        .map_err(|e| EncodeError::EncodingFailed(format!("libwebp: {:?}", e)))?;

    Ok(memory.to_vec())
}

#[cfg(not(feature = "lossy-webp"))]
fn encode_rgba(image: &PixelBuffer, _quality: f64) -> Result<Vec<u8>, EncodeError> {
    use image::codecs::webp::WebPEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn is_webp(bytes: &[u8]) -> bool {
        bytes.len() > 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
    }

    fn textured(width: u32, height: u32, seed: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 7 + y * 3 + seed) % 256) as u8);
                pixels.push(((x * x + y + seed * 11) % 256) as u8);
                pixels.push(((y * 5 + seed) % 256) as u8);
                pixels.push(255);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_encode_webp_container() {
        let bytes = encode_webp(&textured(32, 32, 0), 0.8).unwrap();
        assert!(is_webp(&bytes));
    }

    #[test]
    fn test_webp_decodes_to_same_size() {
        let img = textured(45, 20, 1);
        let bytes = encode_webp(&img, 0.9).unwrap();

        let decoded = decode(&bytes, Some("image/webp")).unwrap();
        assert_eq!((decoded.width, decoded.height), (45, 20));
    }

    #[test]
    fn test_webp_preserves_alpha() {
        let mut img = PixelBuffer::filled(16, 16, [10, 200, 30, 255]);
        for y in 0..16 {
            for x in 0..8 {
                let i = img.index(x, y);
                img.pixels[i + 3] = 0;
            }
        }

        let decoded = decode(&encode_webp(&img, 0.9).unwrap(), None).unwrap();
        assert!(decoded.pixel(1, 8)[3] < 16);
        assert!(decoded.pixel(14, 8)[3] > 240);
    }

    #[test]
    fn test_quality_monotonic_across_samples() {
        let mut grew = 0;
        let samples = 5;
        for seed in 0..samples {
            let img = textured(64, 48 + seed * 4, seed);
            let low = encode_webp(&img, 0.3).unwrap();
            let high = encode_webp(&img, 0.9).unwrap();
            if high.len() >= low.len() {
                grew += 1;
            }
        }
        assert!(grew >= samples - 1, "only {} of {} samples grew", grew, samples);
    }

    #[test]
    fn test_dimension_limit() {
        let img = PixelBuffer::filled(16_384, 1, [0, 0, 0, 255]);
        assert!(matches!(
            encode_webp(&img, 0.9),
            Err(EncodeError::DimensionsExceedFormatLimit { max: 16_383, .. })
        ));
    }

    #[test]
    fn test_quality_shares_jpeg_percent_scale() {
        // 0.0 and 0.004 both round to the minimum percent of 1
        let img = textured(24, 24, 3);
        assert_eq!(encode_webp(&img, 0.0).unwrap(), encode_webp(&img, 0.004).unwrap());
        assert_eq!(encode_webp(&img, 1.0).unwrap(), encode_webp(&img, 0.996).unwrap());
    }

    #[test]
    fn test_out_of_range_quality_is_accepted() {
        let img = textured(8, 8, 2);
        assert!(encode_webp(&img, -0.5).is_ok());
        assert!(encode_webp(&img, 3.0).is_ok());
    }
}
