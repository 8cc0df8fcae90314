//! Image decoding for Pixelift.
//!
//! Turns compressed image bytes (PNG, JPEG, WebP, GIF, BMP) into a plain
//! RGBA [`PixelBuffer`]. EXIF orientation is applied the way a browser does
//! when it draws an `<img>` onto a canvas.
//!
//! # Examples
//!
//! ```ignore
//! use pixelift_core::decode::decode;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode(&bytes, Some("image/jpeg")).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod reader;
mod types;

pub use reader::{decode, decode_with_limits, get_orientation, probe_dimensions, SUPPORTED_INPUT_FORMATS};
pub use types::{DecodeError, Orientation, PixelBuffer, CHANNELS};
