use std::f32::consts::TAU;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::SourceError;

/// Size of the procedurally generated default image
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (1200, 900);

/// Decode an image file into RGBA
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbaImage, SourceError> {
    let path = path.as_ref();
    let img = image::open(path)?.into_rgba8();
    check_not_empty(&img)?;
    log::info!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Decode an in-memory encoded image (PNG or JPEG)
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, SourceError> {
    let img = image::load_from_memory(bytes)?.into_rgba8();
    check_not_empty(&img)?;
    Ok(img)
}

fn check_not_empty(img: &RgbaImage) -> Result<(), SourceError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(SourceError::Empty { width, height });
    }
    Ok(())
}

#[inline]
fn round_down_to_four(v: f64) -> u32 {
    ((v / 4.0).floor() * 4.0).max(0.0) as u32
}

/// Largest size with the original aspect ratio that fits inside the bounds
/// and has both sides divisible by 4
pub fn calculate_new_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;
    let scale = width_ratio.min(height_ratio);

    let mut width = round_down_to_four(original_width as f64 * scale);
    let mut height = round_down_to_four(original_height as f64 * scale);

    while width > max_width || height > max_height {
        width = width.saturating_sub(4);
        height = height.saturating_sub(4);
    }

    (width, height)
}

/// Resample the source onto a canvas of exactly `width` x `height`
pub fn fit_to_canvas(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    imageops::resize(src, width, height, FilterType::Triangle)
}

/// A stylised sun over a horizon, used when no image was supplied
pub fn default_image(width: u32, height: u32) -> RgbaImage {
    let cx = width as f32 * 0.5;
    let cy = height as f32 * 0.45;
    let disc = width.min(height) as f32 * 0.2;
    let horizon = height as f32 * 0.72;
    let rays = 14.0;

    RgbaImage::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f32, y as f32);
        let dx = fx - cx;
        let dy = fy - cy;
        let r = (dx * dx + dy * dy).sqrt();

        if fy >= horizon {
            let band = ((fy - horizon) / 12.0) as u32 % 2;
            return if band == 0 {
                Rgba([40, 32, 70, 255])
            } else {
                Rgba([24, 20, 48, 255])
            };
        }
        if r < disc {
            return Rgba([255, 222, 140, 255]);
        }
        let turn = (dy.atan2(dx) / TAU * rays).rem_euclid(1.0);
        if r < disc * 1.9 && turn < 0.4 {
            return Rgba([236, 150, 70, 255]);
        }

        let t = fy / horizon;
        let sky = |top: f32, bottom: f32| (top + (bottom - top) * t) as u8;
        Rgba([sky(20.0, 120.0), sky(18.0, 60.0), sky(60.0, 90.0), 255])
    })
}
