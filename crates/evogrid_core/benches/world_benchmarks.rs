use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use evogrid_core::{AppConfig, World};

fn bench_config(population: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.world.size = 64;
    config.world.initial_population = population;
    config.world.seed = Some(42);
    config.evolution.ticks_per_generation = u64::MAX;
    config
}

/// Benchmark a single tick of a default-sized world.
fn bench_tick(c: &mut Criterion) {
    let mut world = match World::new(bench_config(200)) {
        Ok(world) => world,
        Err(e) => panic!("bench world: {e}"),
    };

    c.bench_function("world_tick_200", |b| {
        b.iter(|| black_box(world.tick().map(|o| o.events.len())))
    });
}

/// Benchmark a generation boundary on a fresh world.
fn bench_evolve(c: &mut Criterion) {
    c.bench_function("world_evolve_500", |b| {
        b.iter_batched(
            || World::new(bench_config(500)),
            |world| {
                if let Ok(mut world) = world {
                    black_box(world.evolve().map(|r| r.offspring)).ok();
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_tick, bench_evolve);
criterion_main!(benches);
