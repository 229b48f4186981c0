//! # edge-waves
//!
//! Generative sketches built from particles. An image is reduced to an edge
//! map; waves of particles sweep across the canvas and freeze onto the edges
//! they run into, slowly drawing the image's contours.
//!
//! ```ignore
//! use edge_waves::{imaging, Config, Sketch};
//!
//! let source = imaging::default_image(1200, 900);
//! let mut sketch = Sketch::new(Config::default(), source, (800, 600));
//! for _ in 0..600 {
//!     if let Some(status) = sketch.frame() {
//!         println!("{}", status);
//!     }
//! }
//! sketch.canvas().image().save("sketch.png")?;
//! ```

pub mod canvas;
pub mod config;
pub mod error;
pub mod imaging;
pub mod simulation;
pub mod sketch;

pub use canvas::Canvas;
pub use config::{Config, EdgeMode, Param, ParamKey, StartPosition};
pub use error::{AppError, GpuError, SourceError};
pub use imaging::EdgeBuffer;
pub use simulation::{Census, Engine, Particle, ParticleState, Wave, WaveStatus};
pub use sketch::Sketch;
