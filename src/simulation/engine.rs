use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::canvas::Canvas;
use crate::config::{Config, MAX_WAVES};
use crate::imaging::EdgeBuffer;
use crate::simulation::particle::{motion_scale, ParticleState, Step};
use crate::simulation::wave::Wave;

/// Emitted whenever a wave launches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveStatus {
    /// Waves launched since the last restart
    pub wave_count: u64,
    pub threshold: f32,
}

impl fmt::Display for WaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wave {} launched - threshold {:.0}",
            self.wave_count, self.threshold
        )
    }
}

/// Particle counts per state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    pub moving: usize,
    pub cooling: usize,
    pub frozen: usize,
    pub out_of_bounds: usize,
}

impl Census {
    pub fn total(&self) -> usize {
        self.moving + self.cooling + self.frozen + self.out_of_bounds
    }
}

/// Owns the wave FIFO and advances every particle once per tick
pub struct Engine {
    waves: VecDeque<Wave>,
    tick_counter: u64,
    waves_launched: u64,
    /// Tick of the most recent launch; stops the first tick after a restart launching twice
    last_launch: Option<u64>,
    is_playing: bool,
    rng: StdRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible engine for tests and benchmarks
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            waves: VecDeque::with_capacity(MAX_WAVES + 1),
            tick_counter: 0,
            waves_launched: 0,
            last_launch: None,
            is_playing: true,
            rng,
        }
    }

    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    /// Returns the new playing state
    pub fn toggle_play_pause(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        log::info!("{}", if self.is_playing { "Resumed" } else { "Paused" });
        self.is_playing
    }

    pub fn waves(&self) -> &VecDeque<Wave> {
        &self.waves
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn waves_launched(&self) -> u64 {
        self.waves_launched
    }

    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for particle in self.waves.iter().flat_map(|w| w.particles()) {
            match particle.state() {
                ParticleState::Moving => census.moving += 1,
                ParticleState::OnCooldown { .. } => census.cooling += 1,
                ParticleState::Frozen => census.frozen += 1,
                ParticleState::OutOfBounds => census.out_of_bounds += 1,
            }
        }
        census
    }

    /// Create a wave of `numParticles` particles on the configured start edge.
    ///
    /// No-op on a zero-sized canvas or when the particle count is zero.
    pub fn launch_wave(&mut self, config: &Config, (width, height): (u32, u32)) -> Option<WaveStatus> {
        let count = config.particle_count();
        if width == 0 || height == 0 || count == 0 {
            log::trace!("Skipping wave: canvas {}x{}, {} particles", width, height, count);
            return None;
        }

        let wave = Wave::spawn(
            self.waves_launched as u32,
            self.tick_counter,
            count,
            config.start_position,
            (width, height),
            &mut self.rng,
        );
        self.waves.push_back(wave);
        while self.waves.len() > MAX_WAVES {
            if let Some(old) = self.waves.pop_front() {
                log::trace!(
                    "Evicted wave {} (launched at tick {})",
                    old.index(),
                    old.created_at_tick()
                );
            }
        }

        self.waves_launched += 1;
        self.last_launch = Some(self.tick_counter);

        let status = WaveStatus {
            wave_count: self.waves_launched,
            threshold: config.edge_threshold.value,
        };
        log::debug!("{}", status);
        Some(status)
    }

    /// Run one frame: background, maybe a new wave, then update and draw every
    /// particle oldest wave first. Returns the status of a launched wave.
    pub fn tick(&mut self, config: &Config, edges: &EdgeBuffer, canvas: &mut Canvas) -> Option<WaveStatus> {
        if !self.is_playing || canvas.is_empty() {
            return None;
        }
        let dimensions = canvas.dimensions();
        if edges.dimensions() != dimensions {
            log::warn!(
                "Edge buffer {:?} does not match canvas {:?}; skipping tick",
                edges.dimensions(),
                dimensions
            );
            return None;
        }

        canvas.paint_background(config.palette.background, config.trail_strength.value);

        let due = self.tick_counter % config.wave_interval_ticks() == 0;
        let status = if due && self.last_launch != Some(self.tick_counter) {
            self.launch_wave(config, dimensions)
        } else {
            None
        };

        let scale = motion_scale(dimensions.0, dimensions.1);
        let radius = config.particle_size.value * scale;
        let rng = &mut self.rng;
        for wave in self.waves.iter_mut() {
            let step = Step {
                edges,
                config,
                heading: wave.heading(),
                tick: self.tick_counter,
                scale,
            };
            for particle in wave.particles_mut() {
                particle.update(&step, rng);
                particle.draw(canvas, &config.palette, radius);
            }
        }

        self.tick_counter += 1;
        status
    }

    /// Drop every wave, reset the clock, repaint and launch one fresh wave
    pub fn restart(&mut self, config: &Config, canvas: &mut Canvas) -> Option<WaveStatus> {
        self.waves.clear();
        self.tick_counter = 0;
        self.waves_launched = 0;
        self.last_launch = None;
        self.is_playing = true;

        if !canvas.is_empty() {
            canvas.fill(config.palette.background);
        }
        log::info!(
            "Restarting: {} start, {} particles per wave",
            config.start_position.name(),
            config.particle_count()
        );
        self.launch_wave(config, canvas.dimensions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParamKey;

    fn setup(width: u32, height: u32) -> (Config, EdgeBuffer, Canvas) {
        (
            Config::default(),
            EdgeBuffer::blank(width, height),
            Canvas::new(width, height),
        )
    }

    #[test]
    fn test_restart_launches_single_wave() {
        let (config, edges, mut canvas) = setup(120, 80);
        let mut engine = Engine::with_seed(1);
        for _ in 0..250 {
            engine.tick(&config, &edges, &mut canvas);
        }
        assert!(engine.wave_count() > 1);

        let status = engine.restart(&config, &mut canvas);
        assert_eq!(status.map(|s| s.wave_count), Some(1));
        assert_eq!(engine.wave_count(), 1);
        assert_eq!(engine.tick_counter(), 0);

        engine.restart(&config, &mut canvas);
        assert_eq!(engine.wave_count(), 1);
        assert_eq!(engine.tick_counter(), 0);
        assert_eq!(engine.waves_launched(), 1);
    }

    #[test]
    fn test_first_tick_after_restart_does_not_double_launch() {
        let (config, edges, mut canvas) = setup(120, 80);
        let mut engine = Engine::with_seed(2);
        engine.restart(&config, &mut canvas);
        assert_eq!(engine.tick(&config, &edges, &mut canvas), None);
        assert_eq!(engine.wave_count(), 1);
    }

    #[test]
    fn test_waves_launch_on_interval() {
        let (mut config, edges, mut canvas) = setup(120, 80);
        config.set(ParamKey::WaveInterval, 30.0);
        let mut engine = Engine::with_seed(3);

        let mut launches = Vec::new();
        for tick in 0..91 {
            if engine.tick(&config, &edges, &mut canvas).is_some() {
                launches.push(tick);
            }
        }
        assert_eq!(launches, vec![0, 30, 60, 90]);
    }

    #[test]
    fn test_fifo_capped_at_max_waves() {
        let (mut config, edges, mut canvas) = setup(40, 40);
        config.set(ParamKey::WaveInterval, 20.0);
        config.set(ParamKey::NumParticles, 1.0);
        let mut engine = Engine::with_seed(4);

        let mut oldest = None;
        for _ in 0..(MAX_WAVES as u64 + 30) * 20 {
            engine.tick(&config, &edges, &mut canvas);
            assert!(engine.wave_count() <= MAX_WAVES);
            let front = engine.waves().front().map(|w| w.index());
            if engine.wave_count() == MAX_WAVES {
                if let (Some(prev), Some(now)) = (oldest, front) {
                    assert!(now == prev || now == prev + 1, "evicted more than the oldest");
                }
                oldest = front;
            }
        }
        assert_eq!(engine.wave_count(), MAX_WAVES);
        assert_eq!(engine.waves().front().map(|w| w.index()), Some(30));
    }

    #[test]
    fn test_pause_freezes_state() {
        let (config, edges, mut canvas) = setup(100, 100);
        let mut engine = Engine::with_seed(5);
        for _ in 0..10 {
            engine.tick(&config, &edges, &mut canvas);
        }
        assert!(!engine.toggle_play_pause());

        let before: Vec<_> = engine.waves()[0].particles().to_vec();
        let tick = engine.tick_counter();
        for _ in 0..10 {
            assert_eq!(engine.tick(&config, &edges, &mut canvas), None);
        }
        assert_eq!(engine.tick_counter(), tick);
        assert_eq!(engine.waves()[0].particles(), &before[..]);

        assert!(engine.toggle_play_pause());
        engine.tick(&config, &edges, &mut canvas);
        assert_eq!(engine.tick_counter(), tick + 1);
    }

    #[test]
    fn test_degenerate_geometry_is_noop() {
        let (config, edges, mut canvas) = setup(0, 0);
        let mut engine = Engine::with_seed(6);
        assert_eq!(engine.restart(&config, &mut canvas), None);
        assert_eq!(engine.tick(&config, &edges, &mut canvas), None);
        assert_eq!(engine.wave_count(), 0);

        let (mut config, edges, mut canvas) = setup(50, 50);
        config.set(ParamKey::NumParticles, 0.0);
        assert_eq!(engine.restart(&config, &mut canvas), None);
        for _ in 0..200 {
            engine.tick(&config, &edges, &mut canvas);
        }
        assert_eq!(engine.wave_count(), 0);
        assert_eq!(engine.tick_counter(), 200);
    }

    #[test]
    fn test_mismatched_edge_buffer_skips_tick() {
        let config = Config::default();
        let edges = EdgeBuffer::blank(10, 10);
        let mut canvas = Canvas::new(20, 20);
        let mut engine = Engine::with_seed(7);
        assert_eq!(engine.tick(&config, &edges, &mut canvas), None);
        assert_eq!(engine.tick_counter(), 0);
    }

    #[test]
    fn test_census_counts_every_particle() {
        let (config, edges, mut canvas) = setup(100, 60);
        let mut engine = Engine::with_seed(8);
        for _ in 0..300 {
            engine.tick(&config, &edges, &mut canvas);
        }
        let census = engine.census();
        let total: usize = engine.waves().iter().map(|w| w.len()).sum();
        assert_eq!(census.total(), total);
        assert_eq!(census.frozen, 0);
        assert_eq!(census.cooling, 0);
    }

    #[test]
    fn test_status_reports_threshold() {
        let (mut config, _, mut canvas) = setup(30, 30);
        config.set(ParamKey::EdgeThreshold, 120.0);
        let mut engine = Engine::with_seed(9);
        let status = engine.restart(&config, &mut canvas).unwrap();
        assert_eq!(status.threshold, 120.0);
        assert_eq!(status.to_string(), "Wave 1 launched - threshold 120");
    }
}
