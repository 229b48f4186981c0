//! Everything one running sketch needs: live configuration, the source image,
//! its edge map, the canvas and the engine.
//!
//! Image, canvas-size, edge-mode and start-position changes rebuild or reset
//! here; every other parameter is read live by the engine on the next tick.

use std::path::Path;

use image::RgbaImage;

use crate::canvas::Canvas;
use crate::config::{Config, ConfigChange, EdgeMode, ParamKey, PreprocessSettings, StartPosition};
use crate::error::SourceError;
use crate::imaging::{self, calculate_new_dimensions, EdgeBuffer};
use crate::simulation::{Engine, WaveStatus};

pub struct Sketch {
    config: Config,
    source: RgbaImage,
    edges: EdgeBuffer,
    canvas: Canvas,
    engine: Engine,
    /// Largest canvas allowed, usually a fraction of the monitor
    bounds: (u32, u32),
}

impl Sketch {
    pub fn new(config: Config, source: RgbaImage, bounds: (u32, u32)) -> Self {
        Self::with_engine(config, source, bounds, Engine::new())
    }

    pub fn with_engine(config: Config, source: RgbaImage, bounds: (u32, u32), engine: Engine) -> Self {
        let mut sketch = Self {
            config,
            source,
            edges: EdgeBuffer::blank(0, 0),
            canvas: Canvas::new(0, 0),
            engine,
            bounds,
        };
        sketch.rebuild();
        sketch
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn edges(&self) -> &EdgeBuffer {
        &self.edges
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Canvas size for the current source and bounds
    pub fn canvas_size(&self) -> (u32, u32) {
        calculate_new_dimensions(
            self.source.width(),
            self.source.height(),
            self.bounds.0,
            self.bounds.1,
        )
    }

    /// Recompute the edge map from scratch and restart
    fn rebuild(&mut self) -> Option<WaveStatus> {
        let (width, height) = self.canvas_size();
        if self.canvas.dimensions() != (width, height) {
            self.canvas = Canvas::new(width, height);
        }
        self.edges = imaging::edge_map(&self.source, width, height, &self.config);
        log::info!(
            "Canvas {}x{} (divisible by 4: {})",
            width,
            height,
            width % 4 == 0 && height % 4 == 0
        );
        self.engine.restart(&self.config, &mut self.canvas)
    }

    /// Decode and switch to a new image. On failure the current image and
    /// edge map stay in place and the engine keeps running.
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<Option<WaveStatus>, SourceError> {
        let image = imaging::load_image(path)?;
        Ok(self.set_source(image))
    }

    pub fn set_source(&mut self, source: RgbaImage) -> Option<WaveStatus> {
        self.source = source;
        self.rebuild()
    }

    /// New canvas bounds. Rebuilds only when the current canvas no longer
    /// fits or a larger one would; rounding alone never restarts the sketch.
    pub fn resize(&mut self, bounds: (u32, u32)) -> Option<WaveStatus> {
        self.bounds = bounds;
        let (fit_w, fit_h) = self.canvas_size();
        let (w, h) = self.canvas.dimensions();
        let still_fits = w <= bounds.0 && h <= bounds.1;
        if (fit_w, fit_h) == (w, h) || (still_fits && fit_w <= w && fit_h <= h) {
            return None;
        }
        self.rebuild()
    }

    pub fn set_edge_mode(&mut self, mode: EdgeMode) -> Option<WaveStatus> {
        if self.config.edge_mode == mode {
            return None;
        }
        self.config.edge_mode = mode;
        log::info!("Edge mode: {}", mode.name());
        self.rebuild()
    }

    pub fn set_preprocess(&mut self, settings: PreprocessSettings) -> Option<WaveStatus> {
        self.config.preprocess = settings;
        self.rebuild()
    }

    pub fn set_start_position(&mut self, start: StartPosition) -> Option<WaveStatus> {
        match self.config.set_start_position(start) {
            ConfigChange::Reset => {
                log::info!("Start position: {}", start.name());
                self.engine.restart(&self.config, &mut self.canvas)
            }
            ConfigChange::Live => None,
        }
    }

    /// Applied live; returns the clamped value actually stored
    pub fn set_param(&mut self, key: ParamKey, value: f32) -> f32 {
        self.config.set(key, value);
        self.config.param(key).value
    }

    pub fn nudge_param(&mut self, key: ParamKey, steps: i32) -> f32 {
        let value = self.config.param_mut(key).nudge(steps);
        log::info!("{} = {}", key.name(), value);
        value
    }

    /// Randomize every numeric parameter within its range
    pub fn randomize_inputs(&mut self) {
        self.config.randomize(&mut rand::thread_rng());
        for key in ParamKey::ALL {
            log::debug!("{} = {}", key.name(), self.config.param(key).value);
        }
        log::info!("Inputs randomized");
    }

    /// One animation frame
    pub fn frame(&mut self) -> Option<WaveStatus> {
        self.engine.tick(&self.config, &self.edges, &mut self.canvas)
    }

    pub fn restart(&mut self) -> Option<WaveStatus> {
        self.engine.restart(&self.config, &mut self.canvas)
    }

    pub fn toggle_play_pause(&mut self) -> bool {
        self.engine.toggle_play_pause()
    }
}
