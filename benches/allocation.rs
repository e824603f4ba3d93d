//! Allocation Contention Benchmarks
//!
//! Measures scaling of the sequential strategy under contention patterns:
//! - Disjoint keys: each thread allocates in its own namespace (no shared counter)
//! - Shared key: all threads allocate from the same counter (maximum contention)
//! - Service: full identifiers with the reservation check, single thread
//!
//! Run with: cargo bench --bench allocation

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sctid::{
    ComponentCategory, IdentifierService, ItemIdGenerationStrategy, Namespace, Reservation,
    ReservationRegistry, SequentialStrategy,
};
use std::sync::Arc;
use std::time::Duration;

const ITERATIONS_PER_THREAD: usize = 1000;

fn fresh_strategy() -> Arc<SequentialStrategy> {
    Arc::new(SequentialStrategy::new(Arc::new(ReservationRegistry::new())))
}

/// Disjoint key pattern - each thread uses a different namespace
fn bench_disjoint_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention/disjoint");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(ITERATIONS_PER_THREAD as u64));

    for threads in [1u32, 2, 4, 8] {
        group.bench_function(BenchmarkId::new("allocate", threads), |b| {
            b.iter(|| {
                let strategy = fresh_strategy();

                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let strategy = Arc::clone(&strategy);
                        std::thread::spawn(move || {
                            let ns = Namespace::Extension(t + 1);
                            for _ in 0..ITERATIONS_PER_THREAD {
                                strategy
                                    .generate_item_ids(&ns, ComponentCategory::Concept, 1, 1)
                                    .unwrap();
                            }
                        })
                    })
                    .collect();

                for h in handles {
                    h.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

/// Shared key pattern - all threads hit the same counter
fn bench_shared_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention/shared");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(ITERATIONS_PER_THREAD as u64));

    for threads in [1, 2, 4, 8] {
        group.bench_function(BenchmarkId::new("allocate", threads), |b| {
            b.iter(|| {
                let strategy = fresh_strategy();

                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let strategy = Arc::clone(&strategy);
                        std::thread::spawn(move || {
                            for _ in 0..ITERATIONS_PER_THREAD {
                                strategy
                                    .generate_item_ids(
                                        &Namespace::International,
                                        ComponentCategory::Concept,
                                        1,
                                        1,
                                    )
                                    .unwrap();
                            }
                        })
                    })
                    .collect();

                for h in handles {
                    h.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

/// Full identifiers through the service, with reserved blocks to skip
fn bench_service_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("service");

    for batch in [1usize, 10, 100] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_function(BenchmarkId::new("generate", batch), |b| {
            let service = IdentifierService::sequential();
            for block in 0..50u64 {
                let min = 1_000 + block * 1_000;
                service
                    .create_reservation(
                        &format!("block-{}", block),
                        Reservation::range(min, min + 499, Namespace::Extension(1000154), []),
                    )
                    .unwrap();
            }

            b.iter(|| {
                service
                    .generate("1000154", ComponentCategory::Description, batch)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_disjoint_scaling,
    bench_shared_scaling,
    bench_service_generate
);
criterion_main!(benches);
