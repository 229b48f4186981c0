//! End-to-end scenarios: image -> edge map -> engine -> canvas.

use edge_waves::config::{EdgeMode, ParamKey, MAX_WAVES};
use edge_waves::imaging::{self, detect_edges};
use edge_waves::simulation::{Step, WaveSignature};
use edge_waves::{Canvas, Config, Engine, Particle, ParticleState, Sketch, StartPosition};
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn seeded_sketch(config: Config, source: RgbaImage, bounds: (u32, u32)) -> Sketch {
    Sketch::with_engine(config, source, bounds, Engine::with_seed(7))
}

#[test]
fn test_blank_image_never_freezes() {
    let source = RgbaImage::from_pixel(400, 300, WHITE);
    let mut config = Config::default();
    config.set_start_position(StartPosition::Top);
    config.set(ParamKey::NumParticles, 100.0);

    let mut sketch = seeded_sketch(config, source, (400, 300));
    assert_eq!(sketch.edges().count_below(255.0), 0);

    for _ in 0..1000 {
        sketch.frame();
        assert_eq!(sketch.engine().census().frozen, 0);
    }

    // The first wave has long since crossed the canvas
    let first = &sketch.engine().waves()[0];
    assert_eq!(first.index(), 0);
    assert!(first
        .particles()
        .iter()
        .all(|p| p.state() == ParticleState::OutOfBounds));
    assert!(first.is_settled());
}

#[test]
fn test_vertical_line_freezes_expected_fraction() {
    // Four-pixel black line on white
    let image = RgbaImage::from_fn(400, 300, |x, _| if (200..204).contains(&x) { BLACK } else { WHITE });
    let edges = detect_edges(&image, EdgeMode::Binary);

    let mut config = Config::default();
    config.set(ParamKey::Turbulence, 0.0);
    config.set(ParamKey::FrozenProbability, 0.3);
    config.set(ParamKey::AnimationSpeed, 1.0);

    let signature = WaveSignature {
        frequency: 10.0,
        amplitude: 5.0,
    };
    let mut rng = StdRng::seed_from_u64(2024);
    let mut particles: Vec<Particle> = (0..2000)
        .map(|i| Particle::new((0.0, (1 + i % 298) as f32 + 0.5), 0, signature, 1.0))
        .collect();

    for tick in 0..600 {
        let step = Step {
            edges: &edges,
            config: &config,
            heading: StartPosition::Left,
            tick,
            scale: 1.0,
        };
        for particle in particles.iter_mut() {
            particle.update(&step, &mut rng);
        }
    }

    let frozen: Vec<&Particle> = particles.iter().filter(|p| p.frozen()).collect();
    let fraction = frozen.len() as f32 / particles.len() as f32;
    assert!((fraction - 0.3).abs() < 0.05, "frozen fraction {}", fraction);

    // Frozen particles stop on the near side of the line
    for p in &frozen {
        let x = p.position().0;
        assert!((190.0..204.0).contains(&x), "frozen at {}", x);
    }

    // Everyone else hit the line once, then drifted off the right edge
    for p in particles.iter().filter(|p| !p.frozen()) {
        assert!(p.collision_history());
        assert_eq!(p.state(), ParticleState::OutOfBounds);
    }
}

#[test]
fn test_checkerboard_edges_follow_cell_boundaries() {
    const CELL: u32 = 40;
    let source = RgbaImage::from_fn(400, 320, |x, y| {
        if ((x / CELL) + (y / CELL)) % 2 == 0 {
            WHITE
        } else {
            BLACK
        }
    });
    let config = Config::default();
    let edges = imaging::edge_map(&source, 400, 320, &config);
    assert_eq!(edges.dimensions(), (400, 320));

    let threshold = config.edge_threshold.value;
    let near_boundary = |v: u32| (v % CELL).min(CELL - v % CELL) <= 4;
    let mut found = 0;
    for y in 0..320 {
        for x in 0..400 {
            let Some(value) = edges.get(x as i32, y as i32) else {
                panic!("missing cell ({}, {})", x, y);
            };
            if (value as f32) < threshold {
                found += 1;
                assert!(
                    near_boundary(x) || near_boundary(y),
                    "stray edge at ({}, {})",
                    x,
                    y
                );
            }
        }
    }
    assert!(found > 0);

    // Cell centres are flat
    for cy in 0..(320 / CELL) {
        for cx in 0..(400 / CELL) {
            let (x, y) = (cx * CELL + CELL / 2, cy * CELL + CELL / 2);
            assert_eq!(edges.get(x as i32, y as i32), Some(255));
        }
    }
}

#[test]
fn test_restart_is_idempotent() {
    let source = imaging::default_image(400, 300);
    let mut sketch = seeded_sketch(Config::default(), source, (400, 300));
    for _ in 0..250 {
        sketch.frame();
    }
    assert!(sketch.engine().waves_launched() > 1);

    for _ in 0..2 {
        let status = sketch.restart();
        assert_eq!(status.map(|s| s.wave_count), Some(1));
        assert_eq!(sketch.engine().tick_counter(), 0);
        assert_eq!(sketch.engine().wave_count(), 1);
        assert!(sketch.is_playing());

        let background = sketch.config().palette.background;
        let canvas = sketch.canvas();
        assert_eq!(canvas.pixel(0, 0), background);
        assert_eq!(canvas.pixel(canvas.width() - 1, canvas.height() - 1), background);
    }

    // The wave launched by restart stands in for the tick-0 launch
    sketch.frame();
    assert_eq!(sketch.engine().wave_count(), 1);
}

#[test]
fn test_wave_fifo_is_capped() {
    let mut config = Config::default();
    config.set(ParamKey::WaveInterval, 20.0);
    config.set(ParamKey::NumParticles, 1.0);
    let edges = imaging::EdgeBuffer::blank(40, 40);
    let mut canvas = Canvas::new(40, 40);
    let mut engine = Engine::with_seed(3);
    engine.restart(&config, &mut canvas);

    let ticks = (MAX_WAVES as u64 + 50) * 20;
    for _ in 0..ticks {
        engine.tick(&config, &edges, &mut canvas);
    }

    assert_eq!(engine.waves_launched(), MAX_WAVES as u64 + 50);
    assert_eq!(engine.wave_count(), MAX_WAVES);
    // Oldest waves were evicted first
    assert_eq!(engine.waves()[0].index(), 50);
}

#[test]
fn test_paused_sketch_does_not_advance() {
    let source = imaging::default_image(400, 300);
    let mut sketch = seeded_sketch(Config::default(), source, (400, 300));
    for _ in 0..10 {
        sketch.frame();
    }
    assert!(!sketch.toggle_play_pause());

    let ticks = sketch.engine().tick_counter();
    let positions: Vec<(f32, f32)> = sketch.engine().waves()[0]
        .particles()
        .iter()
        .map(Particle::position)
        .collect();
    for _ in 0..10 {
        assert!(sketch.frame().is_none());
    }
    assert_eq!(sketch.engine().tick_counter(), ticks);
    let after: Vec<(f32, f32)> = sketch.engine().waves()[0]
        .particles()
        .iter()
        .map(Particle::position)
        .collect();
    assert_eq!(positions, after);
}
