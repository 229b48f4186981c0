mod engine;
mod particle;
mod wave;

pub use engine::{Census, Engine, WaveStatus};
pub use particle::{motion_scale, Particle, ParticleState, Step};
pub use wave::{Wave, WaveSignature};
