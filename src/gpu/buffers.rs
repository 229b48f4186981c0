use wgpu::{Buffer, BufferUsages, Device, Queue};

use edge_waves::Canvas;

/// Storage buffer mirroring the CPU canvas, plus the uniform describing how to place it
pub struct FrameBuffers {
    /// Canvas pixels, one packed RGBA8 `u32` per pixel
    pub pixel_buffer: Buffer,
    /// Uniform buffer for render parameters
    pub render_params_buffer: Buffer,
    /// Canvas dimensions the pixel buffer was sized for
    pub width: u32,
    pub height: u32,
}

/// Render parameters passed to the present shader (48 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderParams {
    // Canvas and surface sizes (16 bytes)
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub surface_width: u32,
    pub surface_height: u32,

    // 1 when the surface expects linear values and canvas colours must be decoded (16 bytes)
    pub decode_srgb: u32,
    pub _padding: [u32; 3],

    // Colour outside the letterboxed canvas (16 bytes)
    pub letterbox: [f32; 4],
}

impl FrameBuffers {
    /// Create buffers sized for a `width` x `height` canvas
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        // zero-sized storage bindings are invalid; keep one pixel around
        let pixel_count = (width as u64 * height as u64).max(1);

        let pixel_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("canvas-pixel-buffer"),
            size: pixel_count * std::mem::size_of::<u32>() as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let render_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("render-params-buffer"),
            size: std::mem::size_of::<RenderParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!("Allocated frame buffers for {}x{} canvas", width, height);

        Self {
            pixel_buffer,
            render_params_buffer,
            width,
            height,
        }
    }

    pub fn matches(&self, canvas: &Canvas) -> bool {
        canvas.dimensions() == (self.width, self.height)
    }

    /// Copy the canvas into the pixel buffer
    pub fn upload(&self, queue: &Queue, canvas: &Canvas) {
        if canvas.is_empty() {
            return;
        }
        queue.write_buffer(&self.pixel_buffer, 0, canvas.as_raw());
    }

    /// Update render parameters
    pub fn update_render_params(
        &self,
        queue: &Queue,
        surface_size: (u32, u32),
        decode_srgb: bool,
        letterbox: [u8; 4],
    ) {
        let params = RenderParams {
            canvas_width: self.width,
            canvas_height: self.height,
            surface_width: surface_size.0,
            surface_height: surface_size.1,
            decode_srgb: decode_srgb as u32,
            _padding: [0, 0, 0],
            letterbox: letterbox.map(|c| c as f32 / 255.0),
        };
        queue.write_buffer(&self.render_params_buffer, 0, bytemuck::bytes_of(&params));
    }
}
