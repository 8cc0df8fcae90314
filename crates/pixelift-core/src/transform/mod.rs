//! Pixel transforms: resampling and sharpening.
//!
//! Both operations take a read-only source [`PixelBuffer`](crate::decode::PixelBuffer)
//! and return a freshly allocated one. Every output pixel depends only on the
//! source, never on previously written output.
//!
//! # Transform Order
//!
//! 1. Resample to `floor(W * scale) x floor(H * scale)`
//! 2. Sharpen, only when requested and `scale > 1`

mod resample;
mod sharpen;

pub use resample::{
    check_target_dimensions, resample, target_dimensions, ResampleError, ResampleFilter,
};
pub use sharpen::{sharpen, SHARPEN_KERNEL};
