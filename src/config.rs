use rand::Rng;

// ============================================
// Simulation Limits
// ============================================

/// Maximum number of waves kept alive; the oldest is dropped first
pub const MAX_WAVES: usize = 200;

/// Ticks a particle spends on cooldown after passing over an edge without freezing
pub const COOLDOWN_FRAMES: u32 = 120;

/// Distance (pixels) a particle must travel from its spawn edge before it can collide
pub const MIN_TRAVEL_DISTANCE: f32 = 20.0;

/// Cap on the edge lookahead, in cells. Later waves look further ahead up to this depth.
pub const MAX_LOOKAHEAD: u32 = 48;

// ============================================
// Particle Motion
// ============================================

/// Canvas extent (pixels) at which speeds and radii are used unscaled
pub const REFERENCE_EXTENT: f32 = 600.0;

/// Smallest scale factor applied to speeds and radii on tiny canvases
pub const MIN_SCALE: f32 = 0.25;

/// Divides the tick counter inside the oscillation term
pub const OSCILLATION_PERIOD: f32 = 60.0;

/// One-time displacement along the heading on the tick a particle collides
pub const COLLISION_SHIFT_BASE: f32 = 2.0;

/// Extra collision displacement per pixel of progress from the spawn edge
pub const COLLISION_SHIFT_GAIN: f32 = 0.005;

/// Random spread (pixels, either side) of spawn positions along the start edge
pub const SPAWN_JITTER: f32 = 1.5;

/// Wave frequency is drawn from [min, max)
pub const WAVE_FREQUENCY_RANGE: (f32, f32) = (2.0, 20.0);

/// Wave amplitude is drawn from [min, max)
pub const WAVE_AMPLITUDE_RANGE: (f32, f32) = (0.05, 10.0);

/// Per-particle glow alpha is drawn from [min, max)
pub const GLOW_RANGE: (f32, f32) = (0.5, 1.0);

// ============================================
// Image Pipeline
// ============================================

/// Edge intensity that means "no edge here"
pub const NON_EDGE: u8 = 255;

/// Luminance difference below which neighbouring pixels are treated as equal
pub const EDGE_NOISE_FLOOR: f32 = 20.0;

/// Gray level at the centre of the logistic contrast curve
pub const CONTRAST_MIDPOINT: f32 = 200.0;

/// 5x5 binomial kernel used for the Gaussian blur
pub const GAUSSIAN_KERNEL: [[u32; 5]; 5] = [
    [1, 4, 6, 4, 1],
    [4, 16, 24, 16, 4],
    [6, 24, 36, 24, 6],
    [4, 16, 24, 16, 4],
    [1, 4, 6, 4, 1],
];

/// Sum of all weights in `GAUSSIAN_KERNEL`
pub const GAUSSIAN_KERNEL_SUM: u32 = 256;

/// Fraction of the monitor the canvas may cover
pub const MAX_CANVAS_FRACTION: f64 = 0.85;

/// Canvas bounds used when no monitor information is available
pub const FALLBACK_CANVAS_BOUNDS: (u32, u32) = (1280, 800);

/// A bounded numeric parameter that always sits on a multiple of `step`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param {
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Param {
    pub const fn new(value: f32, min: f32, max: f32, step: f32) -> Self {
        Self {
            value,
            min,
            max,
            step,
        }
    }

    /// Clamp to `[min, max]` and snap to the nearest step. Returns the stored value.
    pub fn set(&mut self, value: f32) -> f32 {
        self.value = self.normalize(value);
        self.value
    }

    /// Move by a whole number of steps
    pub fn nudge(&mut self, steps: i32) -> f32 {
        self.set(self.value + steps as f32 * self.step)
    }

    /// Pick a random value inside the range
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        if self.max > self.min {
            let v = rng.gen_range(self.min..=self.max);
            self.set(v)
        } else {
            self.set(self.min)
        }
    }

    fn normalize(&self, value: f32) -> f32 {
        let value = if value.is_finite() { value } else { self.min };
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

/// Names of the numeric parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    AnimationSpeed,
    WaveInterval,
    NumParticles,
    FrozenProbability,
    Turbulence,
    ParticleSize,
    EdgeThreshold,
    TrailStrength,
}

impl ParamKey {
    pub const ALL: [ParamKey; 8] = [
        ParamKey::AnimationSpeed,
        ParamKey::WaveInterval,
        ParamKey::NumParticles,
        ParamKey::FrozenProbability,
        ParamKey::Turbulence,
        ParamKey::ParticleSize,
        ParamKey::EdgeThreshold,
        ParamKey::TrailStrength,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParamKey::AnimationSpeed => "animationSpeed",
            ParamKey::WaveInterval => "waveInterval",
            ParamKey::NumParticles => "numParticles",
            ParamKey::FrozenProbability => "frozenProbability",
            ParamKey::Turbulence => "turbulence",
            ParamKey::ParticleSize => "particleSize",
            ParamKey::EdgeThreshold => "edgeThreshold",
            ParamKey::TrailStrength => "trailStrength",
        }
    }
}

/// Edge the particles enter from. Each variant owns its direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartPosition {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
}

impl StartPosition {
    pub const ALL: [StartPosition; 4] = [
        StartPosition::Left,
        StartPosition::Right,
        StartPosition::Top,
        StartPosition::Bottom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StartPosition::Left => "Left",
            StartPosition::Right => "Right",
            StartPosition::Top => "Top",
            StartPosition::Bottom => "Bottom",
        }
    }

    /// Unit vector of travel
    pub fn direction(&self) -> (i32, i32) {
        match self {
            StartPosition::Left => (1, 0),
            StartPosition::Right => (-1, 0),
            StartPosition::Top => (0, 1),
            StartPosition::Bottom => (0, -1),
        }
    }

    /// True when travel runs along the x axis
    pub fn is_horizontal(&self) -> bool {
        matches!(self, StartPosition::Left | StartPosition::Right)
    }

    /// Distance travelled from the spawn edge
    pub fn progress(&self, (x, y): (f32, f32), width: u32, height: u32) -> f32 {
        match self {
            StartPosition::Left => x,
            StartPosition::Right => (width as f32 - 1.0) - x,
            StartPosition::Top => y,
            StartPosition::Bottom => (height as f32 - 1.0) - y,
        }
    }

    /// Coordinate across the direction of travel
    pub fn perpendicular(&self, (x, y): (f32, f32)) -> f32 {
        if self.is_horizontal() {
            y
        } else {
            x
        }
    }

    /// Length of the spawn edge
    pub fn spawn_extent(&self, width: u32, height: u32) -> f32 {
        if self.is_horizontal() {
            height as f32
        } else {
            width as f32
        }
    }

    /// Point on the spawn edge at `along` pixels from its start
    pub fn spawn_point(&self, along: f32, width: u32, height: u32) -> (f32, f32) {
        match self {
            StartPosition::Left => (0.0, along),
            StartPosition::Right => (width as f32 - 1.0, along),
            StartPosition::Top => (along, 0.0),
            StartPosition::Bottom => (along, height as f32 - 1.0),
        }
    }
}

/// How edge strength is written into the edge buffer. Low values always mean "edge".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// 0 on an edge, 255 elsewhere
    #[default]
    Binary,
    /// Darker the stronger the gradient
    Graded,
}

impl EdgeMode {
    pub fn toggled(&self) -> EdgeMode {
        match self {
            EdgeMode::Binary => EdgeMode::Graded,
            EdgeMode::Graded => EdgeMode::Binary,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EdgeMode::Binary => "binary",
            EdgeMode::Graded => "graded",
        }
    }
}

/// RGBA colours used when painting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 4],
    pub particle: [u8; 4],
    pub edge: [u8; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0x0f, 0x0d, 0x2e, 255],
            particle: [0xdd, 0xa2, 0x90, 255],
            edge: [111, 159, 255, 255],
        }
    }
}

/// Tunables of the image preprocessor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessSettings {
    /// Slope `k` of the logistic contrast curve
    pub contrast_gain: Param,
    /// Unsharp mask strength
    pub sharpen_amount: Param,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            contrast_gain: Param::new(0.004, 0.004, 0.01, 0.001),
            sharpen_amount: Param::new(15.0, 2.0, 15.0, 1.0),
        }
    }
}

/// Whether a configuration change can be applied live or needs a full reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Live,
    Reset,
}

/// Live parameter set read by the engine at the top of every tick
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub animation_speed: Param,
    /// Ticks between wave launches
    pub wave_interval: Param,
    pub num_particles: Param,
    pub frozen_probability: Param,
    pub turbulence: Param,
    pub particle_size: Param,
    pub edge_threshold: Param,
    /// 0 repaints the background solid; higher values leave longer trails
    pub trail_strength: Param,
    pub start_position: StartPosition,
    pub edge_mode: EdgeMode,
    pub palette: Palette,
    pub preprocess: PreprocessSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            animation_speed: Param::new(1.0, 0.1, 4.0, 0.1),
            wave_interval: Param::new(90.0, 20.0, 240.0, 1.0),
            num_particles: Param::new(150.0, 0.0, 400.0, 1.0),
            frozen_probability: Param::new(0.5, 0.0, 1.0, 0.01),
            turbulence: Param::new(1.0, 0.0, 4.0, 0.1),
            particle_size: Param::new(1.0, 0.5, 3.0, 0.1),
            edge_threshold: Param::new(200.0, 0.0, 255.0, 1.0),
            trail_strength: Param::new(0.0, 0.0, 0.95, 0.05),
            start_position: StartPosition::default(),
            edge_mode: EdgeMode::default(),
            palette: Palette::default(),
            preprocess: PreprocessSettings::default(),
        }
    }
}

impl Config {
    pub fn param(&self, key: ParamKey) -> &Param {
        match key {
            ParamKey::AnimationSpeed => &self.animation_speed,
            ParamKey::WaveInterval => &self.wave_interval,
            ParamKey::NumParticles => &self.num_particles,
            ParamKey::FrozenProbability => &self.frozen_probability,
            ParamKey::Turbulence => &self.turbulence,
            ParamKey::ParticleSize => &self.particle_size,
            ParamKey::EdgeThreshold => &self.edge_threshold,
            ParamKey::TrailStrength => &self.trail_strength,
        }
    }

    pub fn param_mut(&mut self, key: ParamKey) -> &mut Param {
        match key {
            ParamKey::AnimationSpeed => &mut self.animation_speed,
            ParamKey::WaveInterval => &mut self.wave_interval,
            ParamKey::NumParticles => &mut self.num_particles,
            ParamKey::FrozenProbability => &mut self.frozen_probability,
            ParamKey::Turbulence => &mut self.turbulence,
            ParamKey::ParticleSize => &mut self.particle_size,
            ParamKey::EdgeThreshold => &mut self.edge_threshold,
            ParamKey::TrailStrength => &mut self.trail_strength,
        }
    }

    /// Set a numeric parameter. Out-of-range values are clamped, never rejected.
    pub fn set(&mut self, key: ParamKey, value: f32) -> ConfigChange {
        self.param_mut(key).set(value);
        ConfigChange::Live
    }

    pub fn set_start_position(&mut self, start: StartPosition) -> ConfigChange {
        if self.start_position == start {
            ConfigChange::Live
        } else {
            self.start_position = start;
            ConfigChange::Reset
        }
    }

    /// Randomize every numeric parameter inside its range
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for key in ParamKey::ALL {
            self.param_mut(key).randomize(rng);
        }
    }

    pub fn wave_interval_ticks(&self) -> u64 {
        (self.wave_interval.value.round() as u64).max(1)
    }

    pub fn particle_count(&self) -> usize {
        self.num_particles.value.round().max(0.0) as usize
    }
}
