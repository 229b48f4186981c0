use rand::Rng;

use crate::config::{
    StartPosition, GLOW_RANGE, SPAWN_JITTER, WAVE_AMPLITUDE_RANGE, WAVE_FREQUENCY_RANGE,
};
use crate::simulation::particle::Particle;

/// Oscillation shared by every particle of a wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSignature {
    pub frequency: f32,
    pub amplitude: f32,
}

impl WaveSignature {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            frequency: rng.gen_range(WAVE_FREQUENCY_RANGE.0..WAVE_FREQUENCY_RANGE.1),
            amplitude: rng.gen_range(WAVE_AMPLITUDE_RANGE.0..WAVE_AMPLITUDE_RANGE.1),
        }
    }
}

/// A batch of particles launched together from the same edge
#[derive(Debug, Clone)]
pub struct Wave {
    particles: Vec<Particle>,
    created_at_tick: u64,
    index: u32,
    signature: WaveSignature,
    heading: StartPosition,
}

impl Wave {
    /// Spread `count` particles evenly along the start edge, with a little jitter
    pub fn spawn<R: Rng + ?Sized>(
        index: u32,
        created_at_tick: u64,
        count: usize,
        heading: StartPosition,
        (width, height): (u32, u32),
        rng: &mut R,
    ) -> Self {
        let signature = WaveSignature::random(rng);
        let extent = heading.spawn_extent(width, height);
        let spacing = if count > 0 { extent / count as f32 } else { 0.0 };
        let last = (extent - 1.0).max(0.0);

        let particles = (0..count)
            .map(|i| {
                let jitter = rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER);
                let along = ((i as f32 + 0.5) * spacing + jitter).clamp(0.0, last);
                let glow = rng.gen_range(GLOW_RANGE.0..GLOW_RANGE.1);
                Particle::new(heading.spawn_point(along, width, height), index, signature, glow)
            })
            .collect();

        Self {
            particles,
            created_at_tick,
            index,
            signature,
            heading,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn created_at_tick(&self) -> u64 {
        self.created_at_tick
    }

    /// Launch order since the last restart
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn signature(&self) -> WaveSignature {
        self.signature
    }

    pub fn heading(&self) -> StartPosition {
        self.heading
    }

    /// No particle of this wave will move again
    pub fn is_settled(&self) -> bool {
        self.particles.iter().all(|p| !p.is_active())
    }
}
