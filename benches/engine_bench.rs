use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qnet_sim::engine::SimulationEngine;
use qnet_sim::models::SimConfig;

fn seeded_config(end_time: f64) -> SimConfig {
    let mut config = SimConfig::default();
    config.seed = Some(42);
    config.end_time = end_time;
    config
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    for end_time in [60.0, 600.0, 6_000.0] {
        group.bench_with_input(
            BenchmarkId::new("cafe_network", end_time as u64),
            &end_time,
            |b, &end_time| {
                b.iter(|| {
                    let mut engine = SimulationEngine::new(seeded_config(end_time))
                        .expect("default config is valid");
                    black_box(engine.run())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
