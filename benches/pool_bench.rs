//! Benchmarks for the worker pool.
//!
//! Benchmarks cover:
//! - Submit-and-wait throughput across worker counts
//! - Buffered versus rendezvous admission
//! - Error routing through the single handler
//! - Mixed workloads with jittered durations

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ctxpool::config::PoolConfig;
use ctxpool::core::{Pool, WorkContext};
use ctxpool::PoolBuilder;
use tokio::runtime::Runtime;

const ITEMS: u64 = 256;

// ============================================================================
// Helpers
// ============================================================================

fn quiet_pool(config: PoolConfig) -> Pool {
    PoolBuilder::from_config(config)
        .error_handler(|_pool, err| {
            black_box(err);
        })
        .build()
        .unwrap()
}

async fn submit_noops(pool: &Pool, items: u64) -> u64 {
    let ctx = WorkContext::background().with_timeout(Duration::from_secs(10));
    let done = Arc::new(AtomicU64::new(0));
    for _ in 0..items {
        let done = Arc::clone(&done);
        pool.submit(&ctx, move |_ctx| async move {
            done.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .await;
    }
    pool.wait().await;
    done.load(Ordering::Relaxed)
}

// ============================================================================
// Throughput
// ============================================================================

fn bench_submit_wait_by_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_wait_by_workers");
    group.throughput(Throughput::Elements(ITEMS));

    for workers in [1, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &workers,
            |b, &workers| {
                b.to_async(Runtime::new().unwrap()).iter(|| async move {
                    let pool = quiet_pool(PoolConfig::new().with_workers(workers));
                    black_box(submit_noops(&pool, ITEMS).await);
                    pool.kill();
                });
            },
        );
    }
    group.finish();
}

fn bench_admission_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission_modes");
    group.throughput(Throughput::Elements(ITEMS));

    let modes = [
        ("rendezvous", PoolConfig::new().with_workers(4)),
        ("buffered_64", PoolConfig::new().with_workers(4).with_admission_buffer(64)),
        ("unbounded", PoolConfig::new().with_workers(4).with_unbounded_admission()),
        ("async_submit", PoolConfig::new().with_workers(4).with_async_submit(true)),
    ];

    for (name, config) in modes {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.to_async(Runtime::new().unwrap()).iter(|| async move {
                let pool = quiet_pool(config.clone());
                black_box(submit_noops(&pool, ITEMS).await);
                pool.kill();
            });
        });
    }
    group.finish();
}

// ============================================================================
// Error routing
// ============================================================================

fn bench_error_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_routing");
    group.throughput(Throughput::Elements(ITEMS));

    for async_errors in [false, true] {
        group.bench_with_input(
            BenchmarkId::from_parameter(if async_errors { "async" } else { "inline" }),
            &async_errors,
            |b, &async_errors| {
                b.to_async(Runtime::new().unwrap()).iter(|| async move {
                    let pool = quiet_pool(
                        PoolConfig::new()
                            .with_workers(4)
                            .with_async_errors(async_errors),
                    );
                    let ctx = WorkContext::background();
                    for i in 0..ITEMS {
                        pool.submit(&ctx, move |_ctx| async move {
                            Err(anyhow::anyhow!("item {i} failed"))
                        })
                        .await;
                    }
                    pool.wait().await;
                    black_box(pool.stats().errors_routed);
                    pool.kill();
                });
            },
        );
    }
    group.finish();
}

// ============================================================================
// Scenarios
// ============================================================================

fn bench_jittered_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("jittered_workload");
    group.sample_size(10);

    group.bench_function("64_items_8_workers", |b| {
        b.to_async(Runtime::new().unwrap()).iter(|| async {
            let delays: Vec<u64> = {
                let mut rng = rand::rng();
                (0..64).map(|_| rng.random_range(0..500)).collect()
            };

            let pool = quiet_pool(PoolConfig::new().with_workers(8));
            let ctx = WorkContext::background().with_timeout(Duration::from_secs(10));
            for micros in delays {
                pool.submit(&ctx, move |_ctx| async move {
                    tokio::time::sleep(Duration::from_micros(micros)).await;
                    Ok(())
                })
                .await;
            }
            pool.wait().await;
            black_box(pool.stats());
            pool.kill();
        });
    });
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(throughput_benches, bench_submit_wait_by_workers, bench_admission_modes);

criterion_group!(error_benches, bench_error_routing);

criterion_group!(scenario_benches, bench_jittered_workload);

criterion_main!(throughput_benches, error_benches, scenario_benches);
