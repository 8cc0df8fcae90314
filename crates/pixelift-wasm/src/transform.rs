//! WASM bindings for the transform pipeline.
//!
//! The UI hands over the raw bytes of the file the user picked plus the
//! current slider/toggle values, and gets back an encoded image ready to be
//! wrapped in a `Blob`. Run these from a Web Worker: a 4x upscale of a large
//! photo can take seconds and the call blocks until it finishes.
//!
//! # Example
//!
//! ```typescript
//! import { transform_image } from '@pixelift/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! // WebP is encoded lossless in the browser build; quality applies to JPEG.
//! const result = transform_image(bytes, file.type, {
//!   scale: 2, format: 'image/jpeg', quality: 0.9, sharpen: true,
//! });
//! const blob = new Blob([result.bytes()], { type: result.mimeType });
//! ```

use crate::types::{options_from_parts, JsProcessResult};
use pixelift_core::{Pipeline, ProcessOptions, ProcessingError};
use wasm_bindgen::prelude::*;

/// Decode, resample, optionally sharpen, and re-encode an image.
///
/// # Arguments
///
/// * `bytes` - The picked file's contents
/// * `mime_type` - The file's claimed MIME type (may be empty)
/// * `options` - `{ scale, format, quality, sharpen }`; missing fields take defaults
///
/// WebP output from this build is lossless, since libwebp is not available on
/// wasm32, so `quality` only affects JPEG here.
///
/// # Errors
///
/// Returns an error string if the options are malformed, the input cannot be
/// decoded, the output would be too large, or encoding fails.
#[wasm_bindgen]
pub fn transform_image(
    bytes: &[u8],
    mime_type: &str,
    options: JsValue,
) -> Result<JsProcessResult, JsValue> {
    let options: ProcessOptions = if options.is_undefined() || options.is_null() {
        ProcessOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| report(&e.to_string()))?
    };

    run(bytes, mime_type, &options)
}

/// Positional variant of [`transform_image`].
///
/// # Arguments
///
/// * `bytes` - The picked file's contents
/// * `scale` - Scale factor (1.0 to 4.0)
/// * `format` - "webp", "png", "jpeg" or the matching MIME type
/// * `quality` - Encoder quality (0.0 to 1.0), ignored for PNG and, in this
///   build, for WebP
/// * `sharpen` - Apply the edge-enhance filter after upscaling
#[wasm_bindgen]
pub fn transform_image_with(
    bytes: &[u8],
    scale: f64,
    format: &str,
    quality: f64,
    sharpen: bool,
) -> Result<JsProcessResult, JsValue> {
    let options = options_from_parts(scale, format, quality, sharpen).map_err(|e| report(&e))?;
    run(bytes, "", &options)
}

fn run(bytes: &[u8], mime_type: &str, options: &ProcessOptions) -> Result<JsProcessResult, JsValue> {
    transform_native(bytes, mime_type, options)
        .map(JsProcessResult::from_result)
        .map_err(|e| report(&e.to_string()))
}

/// The pipeline call without any JS types, so it can be tested natively.
pub(crate) fn transform_native(
    bytes: &[u8],
    mime_type: &str,
    options: &ProcessOptions,
) -> Result<pixelift_core::ProcessResult, ProcessingError> {
    let hint = Some(mime_type).filter(|m| !m.is_empty());
    Pipeline::default().transform_with(
        bytes,
        hint,
        options,
        &enough::Unstoppable,
        &mut |_| {},
    )
}

/// Log an error to the browser console and convert it for JavaScript.
fn report(message: &str) -> JsValue {
    let value = JsValue::from_str(message);
    web_sys::console::error_1(&value);
    value
}
