use rand::Rng;

use crate::canvas::Canvas;
use crate::config::{
    Config, Palette, StartPosition, COLLISION_SHIFT_BASE, COLLISION_SHIFT_GAIN, COOLDOWN_FRAMES,
    MAX_LOOKAHEAD, MIN_SCALE, MIN_TRAVEL_DISTANCE, OSCILLATION_PERIOD, REFERENCE_EXTENT,
};
use crate::imaging::EdgeBuffer;
use crate::simulation::wave::WaveSignature;

/// Scale applied to speeds and radii so a sketch looks the same at any canvas size
pub fn motion_scale(width: u32, height: u32) -> f32 {
    (width.max(height) as f32 / REFERENCE_EXTENT).max(MIN_SCALE)
}

/// Particle lifecycle. `Frozen` and `OutOfBounds` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleState {
    Moving,
    /// Passed over an edge without sticking; cannot freeze until `elapsed` reaches `COOLDOWN_FRAMES`
    OnCooldown { elapsed: u32 },
    Frozen,
    OutOfBounds,
}

/// Read-only inputs of one particle update
pub struct Step<'a> {
    pub edges: &'a EdgeBuffer,
    pub config: &'a Config,
    pub heading: StartPosition,
    pub tick: u64,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: (f32, f32),
    state: ParticleState,
    collision_history: bool,
    wave_index: u32,
    signature: WaveSignature,
    /// Alpha used while the particle has not touched an edge
    glow: f32,
}

impl Particle {
    pub fn new(position: (f32, f32), wave_index: u32, signature: WaveSignature, glow: f32) -> Self {
        Self {
            position,
            state: ParticleState::Moving,
            collision_history: false,
            wave_index,
            signature,
            glow,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn state(&self) -> ParticleState {
        self.state
    }

    pub fn frozen(&self) -> bool {
        self.state == ParticleState::Frozen
    }

    pub fn on_cooldown(&self) -> bool {
        matches!(self.state, ParticleState::OnCooldown { .. })
    }

    pub fn cooldown_counter(&self) -> u32 {
        match self.state {
            ParticleState::OnCooldown { elapsed } => elapsed,
            _ => 0,
        }
    }

    pub fn collision_history(&self) -> bool {
        self.collision_history
    }

    /// Cells sampled ahead of the particle; later waves look further
    pub fn lookahead_depth(&self) -> u32 {
        self.wave_index.min(MAX_LOOKAHEAD)
    }

    /// Still moving or cooling down
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            ParticleState::Moving | ParticleState::OnCooldown { .. }
        )
    }

    /// Colour and alpha this particle is painted with
    pub fn paint(&self, palette: &Palette) -> ([u8; 4], f32) {
        if self.frozen() || self.collision_history {
            (palette.edge, 1.0)
        } else {
            (palette.particle, self.glow)
        }
    }

    /// Advance one tick
    pub fn update<R: Rng + ?Sized>(&mut self, step: &Step<'_>, rng: &mut R) {
        if !self.is_active() {
            return;
        }

        let (width, height) = step.edges.dimensions();
        if !self.in_bounds(width, height) {
            self.state = ParticleState::OutOfBounds;
            return;
        }

        let config = step.config;
        let heading = step.heading;
        let progress = heading.progress(self.position, width, height);

        let mut collided = false;
        if self.state == ParticleState::Moving && progress > MIN_TRAVEL_DISTANCE {
            if let Some(intensity) = self.lookahead(step) {
                if (intensity as f32) < config.edge_threshold.value {
                    if rng.gen::<f32>() < config.frozen_probability.value {
                        self.state = ParticleState::Frozen;
                        return;
                    }
                    self.state = ParticleState::OnCooldown { elapsed: 0 };
                    self.collision_history = true;
                    collided = true;
                }
            }
        }

        let mut displacement = config.animation_speed.value * step.scale;
        if self.collision_history {
            let across = heading.perpendicular(self.position);
            let phase = (step.tick as f32 / OSCILLATION_PERIOD + across) / self.signature.frequency;
            displacement += self.signature.amplitude * config.turbulence.value * phase.sin();
        }
        if collided {
            displacement += COLLISION_SHIFT_BASE + COLLISION_SHIFT_GAIN * progress;
        }

        let (dx, dy) = heading.direction();
        self.position.0 += dx as f32 * displacement;
        self.position.1 += dy as f32 * displacement;

        if let ParticleState::OnCooldown { elapsed } = self.state {
            let elapsed = elapsed + 1;
            self.state = if elapsed >= COOLDOWN_FRAMES {
                ParticleState::Moving
            } else {
                ParticleState::OnCooldown { elapsed }
            };
        }

        if !self.in_bounds(width, height) {
            self.state = ParticleState::OutOfBounds;
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, palette: &Palette, radius: f32) {
        if self.state == ParticleState::OutOfBounds {
            return;
        }
        let (color, alpha) = self.paint(palette);
        canvas.fill_circle(self.position.0, self.position.1, radius, color, alpha);
    }

    /// Edge intensity `lookahead_depth` cells ahead
    fn lookahead(&self, step: &Step<'_>) -> Option<u8> {
        let depth = self.lookahead_depth() as i32;
        let (dx, dy) = step.heading.direction();
        let x = self.position.0.floor() as i32 + dx * depth;
        let y = self.position.1.floor() as i32 + dy * depth;
        step.edges.get(x, y)
    }

    fn in_bounds(&self, width: u32, height: u32) -> bool {
        let (x, y) = self.position;
        x >= 0.0 && y >= 0.0 && x < width as f32 && y < height as f32
    }
}
