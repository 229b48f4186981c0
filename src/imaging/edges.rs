use image::RgbaImage;

use crate::config::{EdgeMode, EDGE_NOISE_FLOOR, NON_EDGE};
use crate::imaging::preprocess::luminance;

/// Per-pixel edge intensity, row-major. Low values mark edges.
///
/// Built once per image/canvas size and never mutated afterwards; a new
/// image produces a new buffer that replaces this one between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl EdgeBuffer {
    /// A buffer with no edges at all
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![NON_EDGE; width as usize * height as usize],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bounds-checked lookup
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Number of cells whose intensity falls below `threshold`
    pub fn count_below(&self, threshold: f32) -> usize {
        self.data.iter().filter(|&&v| (v as f32) < threshold).count()
    }
}

/// Compare each interior pixel against its right and lower neighbours.
///
/// Border pixels stay at `NON_EDGE`. Deterministic.
pub fn detect_edges(image: &RgbaImage, mode: EdgeMode) -> EdgeBuffer {
    let (width, height) = image.dimensions();
    let mut edges = EdgeBuffer::blank(width, height);
    if width < 3 || height < 3 {
        return edges;
    }

    let stride = width as usize;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let here = luminance(image.get_pixel(x, y));
            let right = luminance(image.get_pixel(x + 1, y));
            let below = luminance(image.get_pixel(x, y + 1));
            let max_diff = (here - right).abs().max((here - below).abs());

            edges.data[y as usize * stride + x as usize] = classify(max_diff, mode);
        }
    }

    edges
}

#[inline]
fn classify(max_diff: f32, mode: EdgeMode) -> u8 {
    if max_diff <= EDGE_NOISE_FLOOR {
        return NON_EDGE;
    }
    match mode {
        EdgeMode::Binary => 0,
        EdgeMode::Graded => (255.0 - max_diff * 2.0).round().max(0.0) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checkerboard(width: u32, height: u32, cell: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        for (w, h) in [(1, 1), (3, 3), (17, 5), (64, 48)] {
            let img = RgbaImage::from_pixel(w, h, Rgba([120, 40, 200, 255]));
            for mode in [EdgeMode::Binary, EdgeMode::Graded] {
                let edges = detect_edges(&img, mode);
                assert_eq!(edges.dimensions(), (w, h));
                assert!(edges.data.iter().all(|&v| v == NON_EDGE));
            }
        }
    }

    #[test]
    fn test_checkerboard_edges_sit_on_cell_boundaries() {
        let cell = 8;
        let img = checkerboard(64, 40, cell);
        let edges = detect_edges(&img, EdgeMode::Binary);

        for y in 0..40i32 {
            for x in 0..64i32 {
                let interior = x >= 1 && x < 63 && y >= 1 && y < 39;
                let boundary = (x + 1) as u32 % cell == 0 || (y + 1) as u32 % cell == 0;
                let expected = if interior && boundary { 0 } else { NON_EDGE };
                assert_eq!(edges.get(x, y), Some(expected), "at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_graded_mode_scales_with_contrast() {
        let mut img = RgbaImage::from_pixel(6, 6, Rgba([100, 100, 100, 255]));
        for y in 0..6 {
            img.put_pixel(3, y, Rgba([150, 150, 150, 255]));
        }
        let edges = detect_edges(&img, EdgeMode::Graded);
        // diff of 50 -> 255 - 100
        assert_eq!(edges.get(2, 2), Some(155));
        assert_eq!(edges.get(1, 2), Some(NON_EDGE));

        for y in 0..6 {
            img.put_pixel(3, y, Rgba([255, 255, 255, 255]));
        }
        let edges = detect_edges(&img, EdgeMode::Graded);
        assert_eq!(edges.get(2, 2), Some(0));
    }

    #[test]
    fn test_small_differences_are_noise() {
        let mut img = RgbaImage::from_pixel(5, 5, Rgba([100, 100, 100, 255]));
        img.put_pixel(2, 2, Rgba([115, 115, 115, 255]));
        let edges = detect_edges(&img, EdgeMode::Binary);
        assert_eq!(edges.count_below(1.0), 0);
    }

    #[test]
    fn test_lookup_is_bounds_checked() {
        let edges = EdgeBuffer::blank(4, 3);
        assert_eq!(edges.get(3, 2), Some(NON_EDGE));
        assert_eq!(edges.get(4, 0), None);
        assert_eq!(edges.get(0, 3), None);
        assert_eq!(edges.get(-1, 0), None);
    }
}
