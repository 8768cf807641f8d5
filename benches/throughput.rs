//! Throughput Benchmark for FlashFS
//!
//! This benchmark measures the performance of the store engine
//! under various workloads.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flashfs::service::KeyGenerator;
use flashfs::storage::{StoreConfig, StoreEngine};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

const TTL: Duration = Duration::from_secs(3600);

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Starts an engine on `rt` with timeouts disabled.
fn engine(rt: &Runtime) -> Arc<StoreEngine> {
    let _guard = rt.enter();
    let engine = Arc::new(StoreEngine::new(StoreConfig {
        request_timeout: None,
        ..Default::default()
    }));
    engine.start().unwrap();
    engine
}

/// Benchmark write operations
fn bench_write(c: &mut Criterion) {
    let rt = runtime();
    let engine = engine(&rt);

    let mut group = c.benchmark_group("write");
    group.throughput(Throughput::Elements(1));

    for (name, size) in [("write_small", 16), ("write_medium", 1024), ("write_large", 64 * 1024)] {
        let value = Bytes::from("x".repeat(size));
        let counter = AtomicU64::new(0);

        group.bench_function(name, |b| {
            b.to_async(&rt).iter(|| {
                let i = counter.fetch_add(1, Ordering::Relaxed);
                let engine = Arc::clone(&engine);
                let value = value.clone();
                async move {
                    engine.write(format!("key:{}", i), value, TTL).await.unwrap();
                }
            });
        });
    }

    group.finish();
}

/// Benchmark read operations
fn bench_read(c: &mut Criterion) {
    let rt = runtime();
    let engine = engine(&rt);

    // Pre-populate with data
    rt.block_on(async {
        for i in 0..100_000 {
            engine
                .write(format!("key:{}", i), Bytes::from(format!("value:{}", i)), TTL)
                .await
                .unwrap();
        }
    });

    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Elements(1));

    let counter = AtomicU64::new(0);
    group.bench_function("read_existing", |b| {
        b.to_async(&rt).iter(|| {
            let i = counter.fetch_add(1, Ordering::Relaxed);
            let engine = Arc::clone(&engine);
            async move {
                black_box(engine.read(&format!("key:{}", i % 100_000)).await.ok());
            }
        });
    });

    group.bench_function("read_missing", |b| {
        b.to_async(&rt).iter(|| {
            let i = counter.fetch_add(1, Ordering::Relaxed);
            let engine = Arc::clone(&engine);
            async move {
                black_box(engine.read(&format!("missing:{}", i)).await.ok());
            }
        });
    });

    group.finish();
}

/// Benchmark mixed workload (80% reads, 20% writes)
fn bench_mixed(c: &mut Criterion) {
    let rt = runtime();
    let engine = engine(&rt);

    rt.block_on(async {
        for i in 0..10_000 {
            engine
                .write(format!("key:{}", i), Bytes::from("value"), TTL)
                .await
                .unwrap();
        }
    });

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    let counter = AtomicU64::new(0);
    group.bench_function("80_read_20_write", |b| {
        b.to_async(&rt).iter(|| {
            let i = counter.fetch_add(1, Ordering::Relaxed);
            let engine = Arc::clone(&engine);
            async move {
                if i % 5 == 0 {
                    engine
                        .write(format!("new:{}", i), Bytes::from("value"), TTL)
                        .await
                        .unwrap();
                } else {
                    black_box(engine.read(&format!("key:{}", i % 10_000)).await.ok());
                }
            }
        });
    });

    group.finish();
}

/// Benchmark concurrent callers funnelling into one owner
fn bench_concurrent(c: &mut Criterion) {
    let rt = runtime();

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("8_tasks_write_read", |b| {
        b.to_async(&rt).iter(|| async {
            let engine = engine_in_context();
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let engine = Arc::clone(&engine);
                    tokio::spawn(async move {
                        for i in 0..1_000 {
                            let key = format!("key:{}:{}", t, i);
                            engine.write(key.clone(), Bytes::from("value"), TTL).await.unwrap();
                            black_box(engine.read(&key).await.ok());
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.await.unwrap();
            }

            black_box(engine.len().await.unwrap());
            engine.stop().await;
        });
    });

    group.finish();
}

/// Starts an engine on the runtime the caller is already running on.
fn engine_in_context() -> Arc<StoreEngine> {
    let engine = Arc::new(StoreEngine::new(StoreConfig {
        request_timeout: None,
        ..Default::default()
    }));
    engine.start().unwrap();
    engine
}

/// Benchmark the sweep on a store full of expired objects
fn bench_sweep(c: &mut Criterion) {
    let rt = runtime();

    let mut group = c.benchmark_group("expiry");

    group.bench_function("sweep_10k_expired", |b| {
        b.to_async(&rt).iter(|| async {
            let engine = Arc::new(StoreEngine::new(StoreConfig {
                sweep_interval: Duration::from_millis(1),
                request_timeout: None,
                ..Default::default()
            }));
            engine.start().unwrap();

            for i in 0..10_000 {
                engine
                    .write(format!("key:{}", i), Bytes::from("value"), Duration::ZERO)
                    .await
                    .unwrap();
            }
            while engine.len().await.unwrap() > 0 {
                tokio::task::yield_now().await;
            }
            engine.stop().await;
        });
    });

    group.finish();
}

/// Benchmark key generation
fn bench_keygen(c: &mut Criterion) {
    let keys = KeyGenerator::new();

    let mut group = c.benchmark_group("keygen");
    group.throughput(Throughput::Elements(1));

    group.bench_function("generate", |b| {
        b.iter(|| black_box(keys.generate(black_box("reports/quarterly summary.pdf"))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_write,
    bench_read,
    bench_mixed,
    bench_concurrent,
    bench_sweep,
    bench_keygen,
);

criterion_main!(benches);
