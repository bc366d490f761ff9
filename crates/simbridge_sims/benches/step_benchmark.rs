//! Benchmarks for one simulation step of each reference engine.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use simbridge_core::Outcome;
use simbridge_engine::SimulationEngine;
use simbridge_sims::{BounceConfig, BounceEngine, LifeConfig, LifeEngine};

const NO_INPUT: &[u8] = &[];

fn initial(engine: &dyn SimulationEngine, config: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; 1 << 21];
    match engine.starting_state(config, &mut out) {
        Outcome::Complete { len } => out.truncate(len as usize),
        other => panic!("unexpected {other:?}"),
    }
    out
}

fn bench_bounce_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounce_step");
    for count in [64u32, 1024, 4096] {
        let config = BounceConfig {
            particle_count: count,
            ..BounceConfig::default()
        }
        .to_bytes();
        let state = initial(&BounceEngine, &config);
        let mut out = vec![0u8; state.len()];
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| BounceEngine.state_step(black_box(NO_INPUT), &config, black_box(&state), &mut out));
        });
    }
    group.finish();
}

fn bench_life_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("life_step");
    for side in [64u32, 256, 1024] {
        let config = LifeConfig {
            width: side,
            height: side,
            ..LifeConfig::default()
        }
        .to_bytes();
        let state = initial(&LifeEngine, &config);
        let mut out = vec![0u8; state.len()];
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| LifeEngine.state_step(black_box(NO_INPUT), &config, black_box(&state), &mut out));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bounce_step, bench_life_step);
criterion_main!(benches);
