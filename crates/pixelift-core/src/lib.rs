//! Pixelift Core - Image upscaling library
//!
//! This crate provides the image-transform pipeline behind Pixelift: decode a
//! still image, resample it by a scale factor, optionally sharpen it, and
//! re-encode it as WebP, PNG or JPEG. Everything runs synchronously on
//! in-memory buffers; callers that need responsiveness run it on a worker.

pub mod decode;
pub mod encode;
pub mod pipeline;
pub mod transform;

pub use decode::{DecodeError, PixelBuffer};
pub use encode::{EncodeError, OutputFormat};
pub use pipeline::{transform, CancelFlag, ErrorKind, Pipeline, ProcessResult, ProcessingError, Stage};
pub use transform::{ResampleError, ResampleFilter};

use tracing::warn;

/// Options for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessOptions {
    /// Scale factor applied to both dimensions (the UI offers 1.0 to 4.0)
    pub scale: f64,
    /// Output container format
    pub format: OutputFormat,
    /// Encoder quality (0.0 to 1.0), ignored for PNG
    pub quality: f64,
    /// Apply the edge-enhance filter after upscaling
    pub sharpen: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            format: OutputFormat::Webp,
            quality: 0.9,
            sharpen: false,
        }
    }
}

impl ProcessOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether sharpening will actually run: it is requested and the image grows.
    pub fn sharpen_applies(&self) -> bool {
        self.sharpen && self.scale > 1.0
    }

    /// Check the options and return a normalized copy.
    ///
    /// Scale must be finite and positive. Quality must be finite and is
    /// clamped into `[0, 1]`.
    pub fn validate(&self) -> Result<ProcessOptions, ProcessingError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ProcessingError::InvalidOptions(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if !self.quality.is_finite() {
            return Err(ProcessingError::InvalidOptions(format!(
                "quality must be a number, got {}",
                self.quality
            )));
        }

        let quality = self.quality.clamp(0.0, 1.0);
        if quality != self.quality {
            warn!(requested = self.quality, clamped = quality, "quality out of range");
        }

        Ok(ProcessOptions { quality, ..*self })
    }
}

/// Process-wide settings shared by every run of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Largest allowed input or output width/height
    pub max_dimension: u32,
    /// Largest allowed output area in pixels
    pub max_pixels: u64,
    /// Resampling kernel
    pub filter: ResampleFilter,
    /// Matte for flattening transparency when writing JPEG
    pub jpeg_background: [u8; 3],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dimension: 16_384,
            max_pixels: 64 * 1024 * 1024,
            filter: ResampleFilter::CatmullRom,
            jpeg_background: encode::DEFAULT_JPEG_BACKGROUND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_options_default() {
        let opts = ProcessOptions::new();
        assert_eq!(opts.scale, 2.0);
        assert_eq!(opts.format, OutputFormat::Webp);
        assert!(!opts.sharpen);
    }

    #[test]
    fn test_sharpen_applies_only_when_upscaling() {
        let mut opts = ProcessOptions::new();
        opts.sharpen = true;
        assert!(opts.sharpen_applies());

        opts.scale = 1.0;
        assert!(!opts.sharpen_applies());

        opts.scale = 0.5;
        assert!(!opts.sharpen_applies());
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut opts = ProcessOptions::new();
            opts.scale = scale;
            assert!(matches!(
                opts.validate(),
                Err(ProcessingError::InvalidOptions(_))
            ));
        }
    }

    #[test]
    fn test_validate_clamps_quality() {
        let mut opts = ProcessOptions::new();
        opts.quality = 1.7;
        assert_eq!(opts.validate().unwrap().quality, 1.0);

        opts.quality = -0.2;
        assert_eq!(opts.validate().unwrap().quality, 0.0);

        opts.quality = f64::NAN;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_options_from_js_style_json() {
        let json = r#"{"scale": 3.5, "format": "image/jpeg", "quality": 0.75, "sharpen": true}"#;
        let opts: ProcessOptions = serde_json::from_str(json).unwrap();

        assert_eq!(opts.scale, 3.5);
        assert_eq!(opts.format, OutputFormat::Jpeg);
        assert_eq!(opts.quality, 0.75);
        assert!(opts.sharpen);
    }

    #[test]
    fn test_options_missing_fields_use_defaults() {
        let opts: ProcessOptions = serde_json::from_str(r#"{"format": "png"}"#).unwrap();
        assert_eq!(opts.format, OutputFormat::Png);
        assert_eq!(opts.scale, 2.0);
        assert_eq!(opts.quality, 0.9);
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_dimension, 16_384);
        assert_eq!(config.filter, ResampleFilter::CatmullRom);
        assert_eq!(config.jpeg_background, [0, 0, 0]);
    }

    #[test]
    fn test_pipeline_config_camel_case() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"maxDimension": 4096, "filter": "lanczos3"}"#).unwrap();
        assert_eq!(config.max_dimension, 4096);
        assert_eq!(config.filter, ResampleFilter::Lanczos3);
        assert_eq!(config.max_pixels, 64 * 1024 * 1024);
    }
}
