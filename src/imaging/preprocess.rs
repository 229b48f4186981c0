use image::{Rgba, RgbaImage};

use crate::config::{PreprocessSettings, CONTRAST_MIDPOINT, GAUSSIAN_KERNEL, GAUSSIAN_KERNEL_SUM};

/// Perceptual luminance of an RGBA pixel
#[inline]
pub fn luminance(px: &Rgba<u8>) -> f32 {
    px[0] as f32 * 0.299 + px[1] as f32 * 0.587 + px[2] as f32 * 0.114
}

#[inline]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Run the full preprocessing chain: grayscale + contrast, blur, unsharp mask.
///
/// The output has the same dimensions as the input and is fully opaque.
pub fn preprocess(src: &RgbaImage, settings: &PreprocessSettings) -> RgbaImage {
    let gray = grayscale_contrast(src, settings.contrast_gain.value);
    let blurred = gaussian_blur(&gray);
    unsharp_mask(&gray, &blurred, settings.sharpen_amount.value)
}

/// Grayscale conversion followed by a logistic contrast curve centred on `CONTRAST_MIDPOINT`
pub fn grayscale_contrast(src: &RgbaImage, gain: f32) -> RgbaImage {
    let (width, height) = src.dimensions();
    let mut out = RgbaImage::new(width, height);

    for (dst, px) in out.pixels_mut().zip(src.pixels()) {
        let gray = luminance(px);
        let v = to_channel(255.0 / (1.0 + (-gain * (gray - CONTRAST_MIDPOINT)).exp()));
        *dst = Rgba([v, v, v, 255]);
    }

    out
}

/// 5x5 binomial blur. The 2-pixel frame keeps its input value, and images
/// smaller than the kernel come back unchanged.
pub fn gaussian_blur(src: &RgbaImage) -> RgbaImage {
    let (width, height) = src.dimensions();
    let mut out = src.clone();
    if width < 5 || height < 5 {
        return out;
    }

    let half = GAUSSIAN_KERNEL_SUM / 2;
    for y in 2..height - 2 {
        for x in 2..width - 2 {
            let mut acc = [0u32; 3];
            for (ky, row) in GAUSSIAN_KERNEL.iter().enumerate() {
                for (kx, &weight) in row.iter().enumerate() {
                    let px = src.get_pixel(x + kx as u32 - 2, y + ky as u32 - 2);
                    for (c, sum) in acc.iter_mut().enumerate() {
                        *sum += px[c] as u32 * weight;
                    }
                }
            }
            let blurred = acc.map(|sum| ((sum + half) / GAUSSIAN_KERNEL_SUM) as u8);
            out.put_pixel(x, y, Rgba([blurred[0], blurred[1], blurred[2], 255]));
        }
    }

    out
}

/// `original + amount * (original - blurred)`, clamped per channel
pub fn unsharp_mask(original: &RgbaImage, blurred: &RgbaImage, amount: f32) -> RgbaImage {
    debug_assert_eq!(original.dimensions(), blurred.dimensions());
    let (width, height) = original.dimensions();
    let mut out = RgbaImage::new(width, height);

    for ((dst, o), b) in out.pixels_mut().zip(original.pixels()).zip(blurred.pixels()) {
        let mut px = [0u8, 0, 0, 255];
        for c in 0..3 {
            let orig = o[c] as f32;
            px[c] = to_channel(orig + amount * (orig - b[c] as f32));
        }
        *dst = Rgba(px);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    #[test]
    fn test_contrast_curve_is_centred_on_midpoint() {
        let img = solid(2, 2, [200, 200, 200]);
        let out = grayscale_contrast(&img, 0.004);
        // 255 / (1 + e^0) rounds to 128
        assert_eq!(out.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_contrast_is_monotonic() {
        let dark = grayscale_contrast(&solid(1, 1, [40, 40, 40]), 0.01);
        let light = grayscale_contrast(&solid(1, 1, [240, 240, 240]), 0.01);
        assert!(dark.get_pixel(0, 0)[0] < light.get_pixel(0, 0)[0]);
    }

    #[test]
    fn test_alpha_forced_opaque() {
        let img = RgbaImage::from_pixel(6, 6, Rgba([10, 20, 30, 0]));
        let out = preprocess(&img, &PreprocessSettings::default());
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_blur_preserves_uniform_image() {
        let img = solid(12, 9, [77, 77, 77]);
        assert_eq!(gaussian_blur(&img), img);
    }

    #[test]
    fn test_blur_skips_tiny_images() {
        let mut img = solid(4, 7, [0, 0, 0]);
        img.put_pixel(1, 3, Rgba([255, 255, 255, 255]));
        assert_eq!(gaussian_blur(&img), img);

        let img = solid(1, 1, [9, 9, 9]);
        assert_eq!(gaussian_blur(&img), img);
    }

    #[test]
    fn test_blur_keeps_border_values() {
        let mut img = solid(9, 9, [0, 0, 0]);
        img.put_pixel(4, 4, Rgba([255, 255, 255, 255]));
        img.put_pixel(0, 0, Rgba([99, 99, 99, 255]));
        let out = gaussian_blur(&img);
        assert_eq!(out.get_pixel(0, 0)[0], 99);
        // centre weight 36/256 of 255
        assert_eq!(out.get_pixel(4, 4)[0], 36);
        assert_eq!(out.get_pixel(2, 2)[0], 1);
    }

    #[test]
    fn test_unsharp_mask_amplifies_difference() {
        let original = solid(1, 1, [100, 100, 100]);
        let blurred = solid(1, 1, [90, 90, 90]);
        let out = unsharp_mask(&original, &blurred, 2.0);
        assert_eq!(out.get_pixel(0, 0).0, [120, 120, 120, 255]);

        let out = unsharp_mask(&original, &blurred, 15.0);
        assert_eq!(out.get_pixel(0, 0)[0], 250);

        let blurred = solid(1, 1, [200, 200, 200]);
        let out = unsharp_mask(&original, &blurred, 15.0);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
    }
}
