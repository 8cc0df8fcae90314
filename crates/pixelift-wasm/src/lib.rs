//! Pixelift WASM - WebAssembly bindings for Pixelift
//!
//! This crate exposes the pixelift-core pipeline to the browser UI, which
//! supplies the picked file's bytes and the current options and receives an
//! encoded image back.
//!
//! # Module Structure
//!
//! - `transform` - The pipeline entry points
//! - `types` - WASM-compatible wrapper for the pipeline result
//! - `size` - Byte-size formatting for display
//!
//! # Usage
//!
//! ```typescript
//! import init, { transform_image, format_file_size } from '@pixelift/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = transform_image(bytes, file.type, { scale: 2, format: 'jpeg', quality: 0.9 });
//! console.log(`${result.width}x${result.height}, ${format_file_size(result.byteLength)}`);
//! ```

use wasm_bindgen::prelude::*;

mod size;
mod transform;
mod types;

// Re-export public types
pub use size::format_file_size;
pub use transform::{transform_image, transform_image_with};
pub use types::JsProcessResult;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
