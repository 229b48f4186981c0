use image::{Rgba, RgbaImage};

/// CPU raster surface the engine paints into every tick.
///
/// Always opaque; the GPU side uploads `as_raw()` verbatim.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

#[inline]
fn blend(dst: &mut Rgba<u8>, color: [u8; 4], alpha: f32) {
    let a = alpha.clamp(0.0, 1.0);
    for c in 0..3 {
        let v = color[c] as f32 * a + dst[c] as f32 * (1.0 - a);
        dst[c] = v.round() as u8;
    }
    dst[3] = 255;
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Tightly packed RGBA8 rows
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Solid repaint
    pub fn fill(&mut self, color: [u8; 4]) {
        let px = Rgba([color[0], color[1], color[2], 255]);
        for dst in self.image.pixels_mut() {
            *dst = px;
        }
    }

    /// Blend the whole surface toward `color`. Every channel that is not
    /// already there moves at least one level, so repeated fades converge.
    pub fn fade(&mut self, color: [u8; 4], alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        for dst in self.image.pixels_mut() {
            let before = dst.0;
            blend(dst, color, alpha);
            for c in 0..3 {
                if dst[c] == before[c] && before[c] != color[c] {
                    dst[c] = if before[c] > color[c] {
                        before[c] - 1
                    } else {
                        before[c] + 1
                    };
                }
            }
        }
    }

    /// Solid fill when `trail_strength` is 0, otherwise a partial fill that
    /// leaves the previous frame showing through
    pub fn paint_background(&mut self, color: [u8; 4], trail_strength: f32) {
        if trail_strength <= 0.0 {
            self.fill(color);
        } else {
            self.fade(color, 1.0 - trail_strength);
        }
    }

    /// Alpha-blended disc. The pixel under the centre is always covered, so
    /// sub-pixel radii still leave a mark.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: [u8; 4], alpha: f32) {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 || !cx.is_finite() || !cy.is_finite() {
            return;
        }

        let r = radius.max(0.0);
        let x0 = (cx - r).floor().max(0.0) as i64;
        let y0 = (cy - r).floor().max(0.0) as i64;
        let x1 = ((cx + r).ceil() as i64).min(width as i64 - 1);
        let y1 = ((cy + r).ceil() as i64).min(height as i64 - 1);
        let centre = (cx.floor() as i64, cy.floor() as i64);
        let r2 = r * r;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 || (x, y) == centre {
                    blend(self.image.get_pixel_mut(x as u32, y as u32), color, alpha);
                }
            }
        }
    }
}
