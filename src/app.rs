use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use edge_waves::config::{FALLBACK_CANVAS_BOUNDS, MAX_CANVAS_FRACTION};
use edge_waves::imaging::{self, DEFAULT_IMAGE_SIZE};
use edge_waves::{AppError, Config, ParamKey, Sketch, StartPosition, WaveStatus};

use crate::gpu::{FrameBuffers, GpuContext, RenderPipeline};

const TITLE: &str = "Edge Waves";

/// Application state
pub struct App {
    image_path: Option<PathBuf>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    frame_buffers: Option<FrameBuffers>,
    render_pipeline: Option<RenderPipeline>,
    sketch: Option<Sketch>,
    last_status: Option<WaveStatus>,
    notice: Option<String>,
    fps: f64,
    fps_counter: FpsCounter,
    error: Option<AppError>,
}

impl App {
    pub fn new(image_path: Option<PathBuf>) -> Self {
        Self {
            image_path,
            window: None,
            gpu: None,
            frame_buffers: None,
            render_pipeline: None,
            sketch: None,
            last_status: None,
            notice: None,
            fps: 0.0,
            fps_counter: FpsCounter::new(),
            error: None,
        }
    }

    /// Fatal error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn initial_sketch(&self, bounds: (u32, u32)) -> Sketch {
        let config = Config::default();
        if let Some(path) = &self.image_path {
            match imaging::load_image(path) {
                Ok(source) => return Sketch::new(config, source, bounds),
                Err(e) => log::warn!("{}: {}; using the default image", path.display(), e),
            }
        }
        let (width, height) = DEFAULT_IMAGE_SIZE;
        Sketch::new(config, imaging::default_image(width, height), bounds)
    }

    fn record(&mut self, status: Option<WaveStatus>) {
        if let Some(status) = status {
            log::debug!("{}", status);
            self.last_status = Some(status);
            self.notice = None;
            self.update_title();
        }
    }

    fn update_title(&self) {
        let (Some(window), Some(sketch)) = (&self.window, &self.sketch) else {
            return;
        };
        let mut title = String::from(TITLE);
        if let Some(notice) = &self.notice {
            title.push_str(&format!(" - {}", notice));
        } else if let Some(status) = &self.last_status {
            title.push_str(&format!(" - {}", status));
        }
        let census = sketch.engine().census();
        title.push_str(&format!(
            " - {} moving, {} frozen",
            census.moving + census.cooling,
            census.frozen
        ));
        if !sketch.is_playing() {
            title.push_str(" - paused");
        }
        title.push_str(&format!(" - {:.0} FPS", self.fps));
        window.set_title(&title);
    }

    fn render(&mut self) {
        let (Some(gpu), Some(render), Some(sketch)) =
            (&self.gpu, &self.render_pipeline, &self.sketch)
        else {
            return;
        };

        let canvas = sketch.canvas();
        let buffers_stale = self
            .frame_buffers
            .as_ref()
            .map_or(true, |buffers| !buffers.matches(canvas));
        if buffers_stale {
            let (width, height) = canvas.dimensions();
            self.frame_buffers = Some(FrameBuffers::new(&gpu.device, width, height));
        }
        let Some(buffers) = &self.frame_buffers else {
            return;
        };

        buffers.upload(&gpu.queue, canvas);
        buffers.update_render_params(
            &gpu.queue,
            gpu.surface_size(),
            gpu.format().is_srgb(),
            sketch.config().palette.background,
        );

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let bind_group = render.create_bind_group(
            &gpu.device,
            &buffers.pixel_buffer,
            &buffers.render_params_buffer,
        );
        render.draw(&mut encoder, &view, &bind_group);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            self.fps = fps;
            self.update_title();
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        let Some(sketch) = &mut self.sketch else {
            return;
        };

        let status = match key_code {
            KeyCode::Space => {
                let playing = sketch.toggle_play_pause();
                log::info!("{}", if playing { "Playing" } else { "Paused" });
                None
            }
            KeyCode::Enter | KeyCode::NumpadEnter => sketch.restart(),
            KeyCode::KeyR => {
                sketch.randomize_inputs();
                None
            }

            KeyCode::ArrowLeft => sketch.set_start_position(StartPosition::Left),
            KeyCode::ArrowRight => sketch.set_start_position(StartPosition::Right),
            KeyCode::ArrowUp => sketch.set_start_position(StartPosition::Top),
            KeyCode::ArrowDown => sketch.set_start_position(StartPosition::Bottom),

            KeyCode::KeyM => {
                let mode = sketch.config().edge_mode.toggled();
                sketch.set_edge_mode(mode)
            }

            // Edge threshold
            KeyCode::BracketLeft => {
                sketch.nudge_param(ParamKey::EdgeThreshold, -5);
                None
            }
            KeyCode::BracketRight => {
                sketch.nudge_param(ParamKey::EdgeThreshold, 5);
                None
            }

            // Particles per wave
            KeyCode::Minus => {
                sketch.nudge_param(ParamKey::NumParticles, -10);
                None
            }
            KeyCode::Equal => {
                sketch.nudge_param(ParamKey::NumParticles, 10);
                None
            }

            _ => return,
        };

        self.record(status);
        self.update_title();
        // Paused sketches still repaint once so resets and new images show up
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_dropped_file(&mut self, path: PathBuf) {
        let Some(sketch) = &mut self.sketch else {
            return;
        };
        log::info!("Dropped file: {}", path.display());
        match sketch.load_image(&path) {
            Ok(status) => self.record(status),
            Err(e) => {
                log::warn!("Could not load {}: {}", path.display(), e);
                self.notice = Some(format!("could not load {}", path.display()));
                self.update_title();
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing Edge Waves...");

        let bounds = event_loop
            .primary_monitor()
            .map(|monitor| {
                let size = monitor.size();
                (
                    (size.width as f64 * MAX_CANVAS_FRACTION) as u32,
                    (size.height as f64 * MAX_CANVAS_FRACTION) as u32,
                )
            })
            .filter(|&(w, h)| w > 0 && h > 0)
            .unwrap_or(FALLBACK_CANVAS_BOUNDS);

        let sketch = self.initial_sketch(bounds);
        let (width, height) = sketch.canvas().dimensions();

        // Create window
        let window_attrs = Window::default_attributes()
            .with_title(format!("{} - Initializing...", TITLE))
            .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        // Initialize GPU
        log::info!("Creating GPU context...");
        let gpu = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let frame_buffers = FrameBuffers::new(&gpu.device, width, height);
        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format());

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Space: Play/pause");
        log::info!("  Enter: Restart");
        log::info!("  R: Randomize inputs");
        log::info!("  Arrows: Start position");
        log::info!("  M: Toggle binary/graded edges");
        log::info!("  [/]: Edge threshold");
        log::info!("  -/=: Particles per wave");
        log::info!("  Drop an image on the window to load it");
        log::info!("  Escape: Quit");

        self.last_status = sketch.engine().waves().back().map(|_| WaveStatus {
            wave_count: sketch.engine().waves_launched(),
            threshold: sketch.config().edge_threshold.value,
        });
        self.window = Some(window.clone());
        self.gpu = Some(gpu);
        self.frame_buffers = Some(frame_buffers);
        self.render_pipeline = Some(render_pipeline);
        self.sketch = Some(sketch);
        self.update_title();
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::DroppedFile(path) => self.handle_dropped_file(path),
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    log::debug!("Window resized to {}x{}", new_size.width, new_size.height);
                    gpu.resize(new_size);
                }
                // Refit the canvas to the window; the edge map is rebuilt only if its size changes
                if new_size.width > 0 && new_size.height > 0 {
                    let status = self
                        .sketch
                        .as_mut()
                        .and_then(|sketch| sketch.resize((new_size.width, new_size.height)));
                    self.record(status);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                let playing = self.sketch.as_ref().is_some_and(Sketch::is_playing);
                if playing {
                    let status = self.sketch.as_mut().and_then(Sketch::frame);
                    self.record(status);
                }
                self.render();
                // Only keep ticking while playing
                if playing {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
