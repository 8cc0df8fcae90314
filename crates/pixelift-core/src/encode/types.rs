//! Output formats and encoder errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{PixelBuffer, CHANNELS};

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The format cannot represent an image this large
    #[error("{format} cannot encode {width}x{height}: maximum dimension is {max}")]
    DimensionsExceedFormatLimit {
        format: OutputFormat,
        width: u32,
        height: u32,
        max: u32,
    },

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Target container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// WebP, lossy at the given quality, alpha preserved.
    #[default]
    #[serde(rename = "webp", alias = "image/webp")]
    Webp,
    /// PNG, lossless; quality is ignored.
    #[serde(rename = "png", alias = "image/png")]
    Png,
    /// Baseline JPEG, lossy; alpha is flattened.
    #[serde(rename = "jpeg", alias = "image/jpeg", alias = "jpg")]
    Jpeg,
}

impl OutputFormat {
    /// All formats, in the order the UI offers them.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Webp, OutputFormat::Png, OutputFormat::Jpeg];

    /// The MIME type of encoded output.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Parse a MIME type or short name (`"image/png"`, `"png"`, `"jpg"`, ...).
    pub fn from_mime(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image/webp" | "webp" => Some(OutputFormat::Webp),
            "image/png" | "png" => Some(OutputFormat::Png),
            "image/jpeg" | "image/jpg" | "jpeg" | "jpg" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }

    /// Whether the quality setting affects the output.
    pub fn is_lossy(self) -> bool {
        !matches!(self, OutputFormat::Png)
    }

    /// Largest width or height the format can store.
    pub fn max_dimension(self) -> u32 {
        match self {
            OutputFormat::Webp => 16_383,
            OutputFormat::Png => u32::MAX >> 1,
            OutputFormat::Jpeg => u16::MAX as u32,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Webp => "WebP",
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
        };
        f.write_str(name)
    }
}

/// Map a `[0, 1]` quality to the `1..=100` integer scale lossy encoders use.
///
/// Out-of-range and NaN inputs are clamped.
pub fn quality_to_percent(quality: f64) -> u8 {
    if quality.is_nan() {
        return 1;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Check that a buffer is non-empty, has a consistent length, and fits `format`.
pub(crate) fn validate_buffer(image: &PixelBuffer, format: OutputFormat) -> Result<(), EncodeError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * CHANNELS;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    let max = format.max_dimension();
    if width > max || height > max {
        return Err(EncodeError::DimensionsExceedFormatLimit {
            format,
            width,
            height,
            max,
        });
    }
    Ok(())
}

/// Composite RGBA pixels over an opaque matte, producing packed RGB.
pub fn flatten_alpha(pixels: &[u8], background: [u8; 3]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixels.len() / CHANNELS * 3);
    for px in pixels.chunks_exact(CHANNELS) {
        let alpha = px[3] as u32;
        for c in 0..3 {
            let blended = px[c] as u32 * alpha + background[c] as u32 * (255 - alpha);
            rgb.push(((blended + 127) / 255) as u8);
        }
    }
    rgb
}
