//! WASM-compatible wrapper types for pipeline output.

use js_sys::Uint8Array;
use pixelift_core::{OutputFormat, ProcessOptions, ProcessResult};
use wasm_bindgen::prelude::*;

/// Result of one transform, exposed to JavaScript.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory until `bytes()` copies them into a
/// `Uint8Array`. Wrap that array in a `Blob` for display or download, then
/// call `free()` (or let the finalizer run) to release the WASM copy.
#[wasm_bindgen]
pub struct JsProcessResult {
    inner: ProcessResult,
}

#[wasm_bindgen]
impl JsProcessResult {
    /// Output width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Output height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Size of the encoded image in bytes
    #[wasm_bindgen(getter = byteLength)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_length
    }

    /// Short format name: "webp", "png" or "jpeg"
    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String {
        format_name(self.inner.format).to_string()
    }

    /// MIME type for building a `Blob`
    #[wasm_bindgen(getter = mimeType)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type().to_string()
    }

    /// Copy the encoded bytes into a new `Uint8Array`.
    pub fn bytes(&self) -> Uint8Array {
        Uint8Array::from(self.inner.bytes.as_slice())
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsProcessResult {
    pub(crate) fn from_result(inner: ProcessResult) -> Self {
        Self { inner }
    }
}

/// Lowercase format name matching the option values the UI sends.
pub(crate) fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Webp => "webp",
        OutputFormat::Png => "png",
        OutputFormat::Jpeg => "jpeg",
    }
}

/// Build options from positional arguments.
///
/// `format` accepts a MIME type or short name. Unknown formats are an error.
pub(crate) fn options_from_parts(
    scale: f64,
    format: &str,
    quality: f64,
    sharpen: bool,
) -> Result<ProcessOptions, String> {
    let format =
        OutputFormat::from_mime(format).ok_or_else(|| format!("Unsupported output format: {}", format))?;
    Ok(ProcessOptions {
        scale,
        format,
        quality,
        sharpen,
    })
}
