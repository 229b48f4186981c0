mod edges;
mod preprocess;
mod source;

pub use edges::{detect_edges, EdgeBuffer};
pub use preprocess::{gaussian_blur, grayscale_contrast, luminance, preprocess, unsharp_mask};
pub use source::{
    calculate_new_dimensions, decode_image, default_image, fit_to_canvas, load_image,
    DEFAULT_IMAGE_SIZE,
};

use image::RgbaImage;

use crate::config::Config;

/// Source image -> canvas-sized edge buffer
pub fn edge_map(source: &RgbaImage, width: u32, height: u32, config: &Config) -> EdgeBuffer {
    if width == 0 || height == 0 {
        return EdgeBuffer::blank(width, height);
    }
    let fitted = fit_to_canvas(source, width, height);
    let processed = preprocess(&fitted, &config.preprocess);
    let edges = detect_edges(&processed, config.edge_mode);
    log::debug!(
        "Edge map {}x{} ({} mode): {} edge cells",
        width,
        height,
        config.edge_mode.name(),
        edges.count_below(config.edge_threshold.value)
    );
    edges
}
