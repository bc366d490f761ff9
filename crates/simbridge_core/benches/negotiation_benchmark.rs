//! # Negotiation Benchmark
//!
//! Measures the overhead the protocol adds around a plain copy:
//! - warm buffer (payload fits on the first attempt)
//! - cold buffer (one sized retry)
//!
//! Run with: `cargo bench --package simbridge_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use simbridge_core::{deliver, Delivery, NegotiationLimits, Negotiator};

fn bench_warm_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("negotiate_warm");

    for size in [64usize, 4 * 1024, 256 * 1024] {
        let payload = vec![7u8; size];
        let mut negotiator = Negotiator::default();
        let mut buf = negotiator.buffer();
        buf.ensure_capacity(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                negotiator
                    .negotiate(&mut buf, |out| deliver(black_box(&payload), out, Delivery::Strict))
                    .ok()
            });
        });
    }

    group.finish();
}

fn bench_cold_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("negotiate_cold");

    for size in [64usize, 4 * 1024, 256 * 1024] {
        let payload = vec![7u8; size];
        let limits = NegotiationLimits {
            initial_capacity: 0,
            max_capacity: size,
        };

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut negotiator = Negotiator::new(limits);
                let mut buf = negotiator.buffer();
                negotiator
                    .negotiate(&mut buf, |out| deliver(black_box(&payload), out, Delivery::Strict))
                    .ok()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_warm_buffer, bench_cold_buffer);
criterion_main!(benches);
