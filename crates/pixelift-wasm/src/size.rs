//! Human-readable byte sizes for the result panel.

use wasm_bindgen::prelude::*;

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count with binary (1024) steps, e.g. `1536` → `"1.5 KB"`.
///
/// Values keep at most two decimals with trailing zeros dropped. Sizes of a
/// terabyte or more are still shown in GB.
#[wasm_bindgen]
pub fn format_file_size(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".to_string();
    }

    let exponent = (bytes.ln() / 1024f64.ln()).floor().clamp(0.0, (UNITS.len() - 1) as f64);
    let value = bytes / 1024f64.powi(exponent as i32);

    let mut text = format!("{:.2}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }

    format!("{} {}", text, UNITS[exponent as usize])
}
