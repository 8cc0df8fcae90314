//! Separable image resampling with bicubic (Catmull-Rom) and Lanczos3 kernels.
//!
//! # Algorithm
//!
//! Resampling runs as two one-dimensional passes: horizontal into an `f32`
//! intermediate, then vertical back to `u8`. Each output coordinate maps to a
//! source center using pixel-center alignment:
//!
//! ```text
//! src = (dst + 0.5) * (src_len / dst_len) - 0.5
//! ```
//!
//! Taps that fall outside the source are clamped to the nearest edge pixel.
//! When shrinking, the kernel is stretched by the reduction ratio so the same
//! routine also antialiases. Every channel, alpha included, is filtered the
//! same way, and the final value is rounded and clamped to `[0, 255]`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::decode::{PixelBuffer, CHANNELS};

/// Errors that can occur while resampling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResampleError {
    /// Target width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Target width or height exceeds the allowed maximum.
    #[error("Target {width}x{height} exceeds the maximum of {max}")]
    TooLarge { width: u32, height: u32, max: u64 },
}

/// Interpolation kernel used for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResampleFilter {
    /// Bicubic convolution with a = -0.5 (Catmull-Rom spline), support 2.
    #[default]
    CatmullRom,
    /// Windowed sinc with a = 3, support 3. Sharper, slower.
    Lanczos3,
}

impl ResampleFilter {
    /// Kernel radius in source pixels at unit scale.
    pub fn support(self) -> f64 {
        match self {
            ResampleFilter::CatmullRom => 2.0,
            ResampleFilter::Lanczos3 => 3.0,
        }
    }

    /// Evaluate the kernel at distance `x`.
    pub fn weight(self, x: f64) -> f64 {
        match self {
            ResampleFilter::CatmullRom => cubic_weight(x, -0.5),
            ResampleFilter::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }
}

/// Compute `(floor(width * scale), floor(height * scale))`.
///
/// Results saturate at `u32::MAX`; non-finite or negative scales yield zero.
pub fn target_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale_dim = |d: u32| {
        let v = (d as f64 * scale).floor();
        if v.is_finite() && v > 0.0 {
            // `as` saturates for values above u32::MAX
            v as u32
        } else {
            0
        }
    };
    (scale_dim(width), scale_dim(height))
}

/// Check a target size against zero and the configured maximums.
pub fn check_target_dimensions(
    width: u32,
    height: u32,
    max_dimension: u32,
    max_pixels: u64,
) -> Result<(), ResampleError> {
    if width == 0 || height == 0 {
        return Err(ResampleError::InvalidDimensions { width, height });
    }
    if width > max_dimension || height > max_dimension {
        return Err(ResampleError::TooLarge {
            width,
            height,
            max: max_dimension as u64,
        });
    }
    if width as u64 * height as u64 > max_pixels {
        return Err(ResampleError::TooLarge {
            width,
            height,
            max: max_pixels,
        });
    }
    Ok(())
}

/// Resample `image` to exactly `width` x `height`.
///
/// When the target size equals the source size the output is a
/// pixel-identical copy.
///
/// # Errors
///
/// Returns `ResampleError::InvalidDimensions` if either target dimension is zero.
pub fn resample(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<PixelBuffer, ResampleError> {
    if width == 0 || height == 0 {
        return Err(ResampleError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    if image.is_empty() {
        return Err(ResampleError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    debug!(
        src_width = image.width,
        src_height = image.height,
        width,
        height,
        ?filter,
        "resampling"
    );

    let src_w = image.width as usize;
    let src_h = image.height as usize;
    let dst_w = width as usize;
    let dst_h = height as usize;

    let horizontal = if dst_w == src_w {
        image.pixels.iter().map(|&v| v as f32).collect::<Vec<f32>>()
    } else {
        let taps = compute_contributions(src_w, dst_w, filter);
        horizontal_pass(&image.pixels, src_w, src_h, &taps)
    };

    let pixels = if dst_h == src_h {
        horizontal.iter().map(|&v| quantize(v)).collect()
    } else {
        let taps = compute_contributions(src_h, dst_h, filter);
        vertical_pass(&horizontal, dst_w, src_h, &taps)
    };

    Ok(PixelBuffer::new(width, height, pixels))
}

/// Source taps and normalized weights for one output coordinate.
#[derive(Debug, Clone)]
struct Contribution {
    taps: Vec<(usize, f32)>,
}

fn compute_contributions(src_len: usize, dst_len: usize, filter: ResampleFilter) -> Vec<Contribution> {
    let ratio = src_len as f64 / dst_len as f64;
    let filter_scale = ratio.max(1.0);
    let radius = filter.support() * filter_scale;
    let last = src_len as i64 - 1;

    (0..dst_len)
        .map(|dst| {
            let center = (dst as f64 + 0.5) * ratio - 0.5;
            let start = (center - radius).floor() as i64;
            let end = (center + radius).ceil() as i64;

            let mut taps: Vec<(usize, f32)> = Vec::with_capacity((end - start + 1) as usize);
            let mut total = 0.0f64;
            let mut raw = Vec::with_capacity(taps.capacity());

            for i in start..=end {
                let w = filter.weight((i as f64 - center) / filter_scale);
                if w == 0.0 {
                    continue;
                }
                // Clamp-to-edge: out-of-range taps reuse the nearest border pixel
                let idx = i.clamp(0, last) as usize;
                raw.push((idx, w));
                total += w;
            }

            for (idx, w) in raw {
                let normalized = if total.abs() > f64::EPSILON { w / total } else { w };
                match taps.last_mut() {
                    Some((last_idx, acc)) if *last_idx == idx => *acc += normalized as f32,
                    _ => taps.push((idx, normalized as f32)),
                }
            }

            Contribution { taps }
        })
        .collect()
}

fn horizontal_pass(src: &[u8], src_w: usize, rows: usize, taps: &[Contribution]) -> Vec<f32> {
    let dst_w = taps.len();
    let mut out = vec![0.0f32; dst_w * rows * CHANNELS];

    for y in 0..rows {
        let src_row = &src[y * src_w * CHANNELS..(y + 1) * src_w * CHANNELS];
        let dst_row = &mut out[y * dst_w * CHANNELS..(y + 1) * dst_w * CHANNELS];

        for (x, contribution) in taps.iter().enumerate() {
            let mut acc = [0.0f32; CHANNELS];
            for &(sx, w) in &contribution.taps {
                let p = &src_row[sx * CHANNELS..sx * CHANNELS + CHANNELS];
                for c in 0..CHANNELS {
                    acc[c] += p[c] as f32 * w;
                }
            }
            dst_row[x * CHANNELS..x * CHANNELS + CHANNELS].copy_from_slice(&acc);
        }
    }

    out
}

fn vertical_pass(src: &[f32], width: usize, src_h: usize, taps: &[Contribution]) -> Vec<u8> {
    debug_assert_eq!(src.len(), width * src_h * CHANNELS);
    let row_len = width * CHANNELS;
    let mut out = vec![0u8; taps.len() * row_len];

    for (y, contribution) in taps.iter().enumerate() {
        let dst_row = &mut out[y * row_len..(y + 1) * row_len];
        for (i, value) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for &(sy, w) in &contribution.taps {
                acc += src[sy * row_len + i] * w;
            }
            *value = quantize(acc);
        }
    }

    out
}

/// Round to nearest and clamp into the u8 range.
#[inline]
fn quantize(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Keys' cubic convolution kernel. `a = -0.5` gives Catmull-Rom.
fn cubic_weight(x: f64, a: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        (a + 2.0) * x * x * x - (a + 3.0) * x * x + 1.0
    } else if x < 2.0 {
        a * x * x * x - 5.0 * a * x * x + 8.0 * a * x - 4.0 * a
    } else {
        0.0
    }
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gradient with a varying alpha ramp.
    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(128);
                pixels.push((((x + y) * 255) / (width + height)) as u8);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_identity_at_same_size() {
        let img = test_image(37, 23);
        let out = resample(&img, 37, 23, ResampleFilter::CatmullRom).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_single_axis_change_keeps_other_axis_exact() {
        // Width unchanged: every column of a vertically-constant image is preserved
        let mut img = PixelBuffer::filled(5, 4, [0, 0, 0, 255]);
        for y in 0..4 {
            for x in 0..5 {
                let i = img.index(x, y);
                img.pixels[i] = (x * 50) as u8;
            }
        }

        let out = resample(&img, 5, 8, ResampleFilter::CatmullRom).unwrap();
        for y in 0..8 {
            for x in 0..5 {
                assert_eq!(out.pixel(x, y), [(x * 50) as u8, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn test_upscale_dimensions() {
        let img = test_image(50, 25);
        let out = resample(&img, 100, 50, ResampleFilter::CatmullRom).unwrap();

        assert_eq!(out.width, 100);
        assert_eq!(out.height, 50);
        assert_eq!(out.pixels.len(), 100 * 50 * 4);
    }

    #[test]
    fn test_downscale_dimensions() {
        let img = test_image(100, 50);
        let out = resample(&img, 33, 17, ResampleFilter::Lanczos3).unwrap();
        assert_eq!((out.width, out.height), (33, 17));
    }

    #[test]
    fn test_zero_dimensions_error() {
        let img = test_image(10, 10);

        assert_eq!(
            resample(&img, 0, 10, ResampleFilter::CatmullRom),
            Err(ResampleError::InvalidDimensions { width: 0, height: 10 })
        );
        assert!(resample(&img, 10, 0, ResampleFilter::CatmullRom).is_err());
    }

    #[test]
    fn test_flat_image_stays_flat() {
        let img = PixelBuffer::filled(9, 7, [200, 10, 60, 180]);

        for filter in [ResampleFilter::CatmullRom, ResampleFilter::Lanczos3] {
            let up = resample(&img, 31, 22, filter).unwrap();
            assert!(up.pixels.chunks_exact(4).all(|p| p == [200, 10, 60, 180]));

            let down = resample(&img, 4, 3, filter).unwrap();
            assert!(down.pixels.chunks_exact(4).all(|p| p == [200, 10, 60, 180]));
        }
    }

    #[test]
    fn test_alpha_is_resampled() {
        // Left half transparent, right half opaque
        let mut img = PixelBuffer::filled(8, 2, [255, 255, 255, 0]);
        for y in 0..2 {
            for x in 4..8 {
                let i = img.index(x, y);
                img.pixels[i + 3] = 255;
            }
        }

        let out = resample(&img, 32, 8, ResampleFilter::CatmullRom).unwrap();
        assert_eq!(out.pixel(0, 0)[3], 0);
        assert_eq!(out.pixel(31, 0)[3], 255);
        let mid = out.pixel(16, 0)[3];
        assert!(mid > 0 && mid < 255, "alpha at the edge should blend, got {}", mid);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        // Hard black/white edge makes Catmull-Rom ring beyond [0, 255]
        let mut img = PixelBuffer::filled(6, 1, [0, 0, 0, 255]);
        for x in 3..6 {
            let i = img.index(x, 0);
            img.pixels[i..i + 3].copy_from_slice(&[255, 255, 255]);
        }

        let out = resample(&img, 24, 4, ResampleFilter::CatmullRom).unwrap();
        assert_eq!(out.pixel(0, 0)[0], 0);
        assert_eq!(out.pixel(23, 3)[0], 255);
    }

    #[test]
    fn test_one_pixel_source() {
        let img = PixelBuffer::filled(1, 1, [12, 34, 56, 78]);
        let out = resample(&img, 4, 4, ResampleFilter::Lanczos3).unwrap();
        assert!(out.pixels.chunks_exact(4).all(|p| p == [12, 34, 56, 78]));
    }

    #[test]
    fn test_target_dimensions_floor() {
        assert_eq!(target_dimensions(100, 100, 2.0), (200, 200));
        assert_eq!(target_dimensions(333, 101, 1.5), (499, 151));
        assert_eq!(target_dimensions(3, 3, 0.1), (0, 0));
        assert_eq!(target_dimensions(10, 10, f64::NAN), (0, 0));
    }

    #[test]
    fn test_check_target_dimensions() {
        assert!(check_target_dimensions(200, 200, 16_384, 1 << 26).is_ok());
        assert_eq!(
            check_target_dimensions(0, 5, 100, 1000),
            Err(ResampleError::InvalidDimensions { width: 0, height: 5 })
        );
        assert_eq!(
            check_target_dimensions(101, 5, 100, 1000),
            Err(ResampleError::TooLarge { width: 101, height: 5, max: 100 })
        );
        assert_eq!(
            check_target_dimensions(50, 50, 100, 1000),
            Err(ResampleError::TooLarge { width: 50, height: 50, max: 1000 })
        );
    }

    #[test]
    fn test_cubic_weight_properties() {
        assert!((cubic_weight(0.0, -0.5) - 1.0).abs() < f64::EPSILON);
        assert!(cubic_weight(1.0, -0.5).abs() < 1e-12);
        assert!(cubic_weight(2.0, -0.5).abs() < 1e-12);
        assert!((cubic_weight(0.7, -0.5) - cubic_weight(-0.7, -0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_lanczos_weight_at_zero_and_boundary() {
        assert!((lanczos_weight(0.0, 3.0) - 1.0).abs() < f64::EPSILON);
        assert!(lanczos_weight(3.0, 3.0).abs() < f64::EPSILON);
        assert!(lanczos_weight(1.0, 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_contributions_are_normalized() {
        for filter in [ResampleFilter::CatmullRom, ResampleFilter::Lanczos3] {
            for contribution in compute_contributions(10, 37, filter) {
                let sum: f32 = contribution.taps.iter().map(|&(_, w)| w).sum();
                assert!((sum - 1.0).abs() < 1e-4, "weights sum to {}", sum);
                assert!(contribution.taps.iter().all(|&(i, _)| i < 10));
            }
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
