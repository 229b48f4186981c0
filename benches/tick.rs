//! Benchmarks for the CPU pipeline: edge maps and engine ticks.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use edge_waves::config::ParamKey;
use edge_waves::imaging::{self, default_image};
use edge_waves::{Canvas, Config, Engine};

fn bench_edge_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_map");
    let source = default_image(1200, 900);
    let config = Config::default();

    for (width, height) in [(400, 300), (800, 600), (1200, 900)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &(width, height),
            |b, &(w, h)| b.iter(|| black_box(imaging::edge_map(&source, w, h, &config))),
        );
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    let (width, height) = (800, 600);
    let source = default_image(width, height);

    for waves in [1usize, 20, 100] {
        let mut config = Config::default();
        config.set(ParamKey::WaveInterval, 20.0);
        let edges = imaging::edge_map(&source, width, height, &config);
        let mut canvas = Canvas::new(width, height);
        let mut engine = Engine::with_seed(42);
        engine.restart(&config, &mut canvas);
        while engine.wave_count() < waves {
            engine.tick(&config, &edges, &mut canvas);
        }

        group.bench_with_input(BenchmarkId::new("waves", waves), &waves, |b, _| {
            b.iter(|| black_box(engine.tick(&config, &edges, &mut canvas)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_edge_map, bench_tick);
criterion_main!(benches);
