//! Benchmarks for searching a single full block.

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use tripcode_api::Keyspace;
use tripcode_core::{LocalDealer, Tripper, TripperConfig};

fn bench_block(c: &mut Criterion) {
    let keyspace = Keyspace::default();
    let dealer = Arc::new(LocalDealer::new(keyspace).unwrap());

    let mut group = c.benchmark_group("tripper");
    group.sample_size(10);
    group.throughput(Throughput::Elements(keyspace.block_size()));

    group.bench_function("one_block", |b| {
        b.iter(|| {
            let t = Tripper::new(
                dealer.clone(),
                TripperConfig {
                    once: true,
                    ..TripperConfig::new("aaaaaaaaaa")
                },
            );
            t.run().unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_block);
criterion_main!(benches);
