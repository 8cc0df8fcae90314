//! 3x3 edge-enhance convolution used to counteract upscaling blur.

use tracing::debug;

use crate::decode::{PixelBuffer, CHANNELS};

/// Edge-enhance kernel in row-major order. Weights sum to 1, so flat regions
/// are reproduced exactly.
pub const SHARPEN_KERNEL: [i32; 9] = [
    0, -1, 0, //
    -1, 5, -1, //
    0, -1, 0,
];

/// Apply [`SHARPEN_KERNEL`] to the RGB channels of every interior pixel.
///
/// The one-pixel border and the alpha channel are copied unchanged. All sums
/// read from the untouched source, so the result does not depend on the order
/// pixels are visited. Buffers narrower or shorter than 3 pixels are returned
/// as an unchanged copy.
pub fn sharpen(image: &PixelBuffer) -> PixelBuffer {
    convolve3x3(image, &SHARPEN_KERNEL)
}

/// Convolve the RGB channels of `image` with an arbitrary integer 3x3 kernel.
pub(crate) fn convolve3x3(image: &PixelBuffer, kernel: &[i32; 9]) -> PixelBuffer {
    let mut output = image.clone();
    if image.width < 3 || image.height < 3 {
        return output;
    }

    debug!(width = image.width, height = image.height, "sharpening");

    let w = image.width as usize;
    let h = image.height as usize;
    let src = &image.pixels;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = (y * w + x) * CHANNELS;
            let mut sum = [0i32; 3];

            for ky in 0..3 {
                for kx in 0..3 {
                    let weight = kernel[ky * 3 + kx];
                    if weight == 0 {
                        continue;
                    }
                    let k_idx = ((y + ky - 1) * w + (x + kx - 1)) * CHANNELS;
                    sum[0] += src[k_idx] as i32 * weight;
                    sum[1] += src[k_idx + 1] as i32 * weight;
                    sum[2] += src[k_idx + 2] as i32 * weight;
                }
            }

            output.pixels[idx] = clamp_channel(sum[0]);
            output.pixels[idx + 1] = clamp_channel(sum[1]);
            output.pixels[idx + 2] = clamp_channel(sum[2]);
            // Alpha remains unchanged
        }
    }

    output
}

#[inline]
fn clamp_channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_image(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..width * height * 4)
            .map(|i| ((i * 37 + i / 7) % 256) as u8)
            .collect();
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_kernel_sums_to_one() {
        assert_eq!(SHARPEN_KERNEL.iter().sum::<i32>(), 1);
    }

    #[test]
    fn test_flat_image_is_unchanged() {
        let img = PixelBuffer::filled(10, 8, [90, 160, 30, 200]);
        assert_eq!(sharpen(&img), img);
    }

    #[test]
    fn test_border_and_alpha_untouched() {
        let img = noisy_image(9, 6);
        let out = sharpen(&img);

        for y in 0..img.height {
            for x in 0..img.width {
                let before = img.pixel(x, y);
                let after = out.pixel(x, y);
                assert_eq!(before[3], after[3], "alpha changed at ({}, {})", x, y);

                let border = x == 0 || y == 0 || x == img.width - 1 || y == img.height - 1;
                if border {
                    assert_eq!(before, after, "border changed at ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_single_bright_pixel() {
        let mut img = PixelBuffer::filled(5, 5, [100, 100, 100, 255]);
        let i = img.index(2, 2);
        img.pixels[i..i + 3].copy_from_slice(&[120, 120, 120]);

        let out = sharpen(&img);
        // Center: 5*120 - 4*100 = 200
        assert_eq!(out.pixel(2, 2), [200, 200, 200, 255]);
        // Orthogonal neighbor: 5*100 - 3*100 - 120 = 80
        assert_eq!(out.pixel(2, 1), [80, 80, 80, 255]);
        // Diagonal neighbor sees only flat values
        assert_eq!(out.pixel(1, 1), [100, 100, 100, 255]);
    }

    #[test]
    fn test_reads_from_source_not_output() {
        // A stripe pattern whose result would differ if writes fed later reads
        let mut img = PixelBuffer::filled(5, 3, [0, 0, 0, 255]);
        for x in [1u32, 3] {
            let i = img.index(x, 1);
            img.pixels[i..i + 3].copy_from_slice(&[60, 60, 60]);
        }

        let out = sharpen(&img);
        assert_eq!(out.pixel(1, 1)[0], 255); // 5*60 = 300 -> clamped
        assert_eq!(out.pixel(2, 1)[0], 0); // -60 - 60 -> clamped
        assert_eq!(out.pixel(3, 1)[0], 255);
    }

    #[test]
    fn test_small_buffers_are_noop() {
        for (w, h) in [(1, 1), (2, 5), (5, 2), (0, 0)] {
            let img = noisy_image(w, h);
            assert_eq!(sharpen(&img), img);
        }
    }

    #[test]
    fn test_identity_kernel() {
        let img = noisy_image(7, 7);
        let identity = [0, 0, 0, 0, 1, 0, 0, 0, 0];
        assert_eq!(convolve3x3(&img, &identity), img);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
