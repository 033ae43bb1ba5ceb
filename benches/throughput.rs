//! Throughput Benchmark for FieldKV
//!
//! This benchmark measures the performance of the keyspace
//! under various hash workloads.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fieldkv::storage::KeySpace;
use std::sync::Arc;
use std::time::Duration;

fn populate_hash(keyspace: &KeySpace, key: &str, fields: usize) {
    let pairs: Vec<(Bytes, Bytes)> = (0..fields)
        .map(|i| {
            (
                Bytes::from(format!("field:{}", i)),
                Bytes::from(format!("value:{}", i)),
            )
        })
        .collect();
    keyspace.hset(Bytes::from(key.to_string()), pairs).unwrap();
}

/// Benchmark HSET operations
fn bench_hset(c: &mut Criterion) {
    let keyspace = Arc::new(KeySpace::new());

    let mut group = c.benchmark_group("hset");
    group.throughput(Throughput::Elements(1));

    group.bench_function("hset_new_key", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            keyspace
                .hset(key, vec![(Bytes::from("field"), Bytes::from("value"))])
                .unwrap();
            i += 1;
        });
    });

    group.bench_function("hset_new_field", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let field = Bytes::from(format!("field:{}", i));
            keyspace
                .hset(Bytes::from("growing"), vec![(field, Bytes::from("value"))])
                .unwrap();
            i += 1;
        });
    });

    group.bench_function("hset_overwrite", |b| {
        b.iter(|| {
            keyspace
                .hset(
                    Bytes::from("stable"),
                    vec![(Bytes::from("field"), Bytes::from("value"))],
                )
                .unwrap();
        });
    });

    group.bench_function("hset_batch_8", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let pairs: Vec<(Bytes, Bytes)> = (0..8)
                .map(|f| {
                    (
                        Bytes::from(format!("field:{}", f)),
                        Bytes::from(format!("value:{}", i)),
                    )
                })
                .collect();
            keyspace.hset(Bytes::from(format!("batch:{}", i)), pairs).unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark HGET operations
fn bench_hget(c: &mut Criterion) {
    let keyspace = Arc::new(KeySpace::new());

    // Pre-populate one wide hash and many narrow ones
    populate_hash(&keyspace, "profile", 100_000);
    for i in 0..10_000 {
        populate_hash(&keyspace, &format!("user:{}", i), 4);
    }

    let mut group = c.benchmark_group("hget");
    group.throughput(Throughput::Elements(1));

    group.bench_function("hget_wide_hash", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let field = format!("field:{}", i % 100_000);
            black_box(keyspace.hget(b"profile", field.as_bytes()).unwrap());
            i += 1;
        });
    });

    group.bench_function("hget_narrow_hash", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("user:{}", i % 10_000);
            black_box(keyspace.hget(key.as_bytes(), b"field:2").unwrap());
            i += 1;
        });
    });

    group.bench_function("hget_missing_field", |b| {
        b.iter(|| {
            black_box(keyspace.hget(b"profile", b"no_such_field").unwrap());
        });
    });

    group.bench_function("hget_missing_key", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(keyspace.hget(key.as_bytes(), b"field").unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark HGETALL snapshots at different hash sizes
fn bench_hgetall(c: &mut Criterion) {
    let keyspace = Arc::new(KeySpace::new());

    populate_hash(&keyspace, "hash:10", 10);
    populate_hash(&keyspace, "hash:100", 100);
    populate_hash(&keyspace, "hash:1000", 1000);

    let mut group = c.benchmark_group("hgetall");
    group.throughput(Throughput::Elements(1));

    group.bench_function("hgetall_10", |b| {
        b.iter(|| {
            black_box(keyspace.hgetall(b"hash:10").unwrap());
        });
    });

    group.bench_function("hgetall_100", |b| {
        b.iter(|| {
            black_box(keyspace.hgetall(b"hash:100").unwrap());
        });
    });

    group.bench_function("hgetall_1000", |b| {
        b.iter(|| {
            black_box(keyspace.hgetall(b"hash:1000").unwrap());
        });
    });

    group.finish();
}

/// Benchmark mixed workload (80% reads, 20% writes)
fn bench_mixed(c: &mut Criterion) {
    let keyspace = Arc::new(KeySpace::new());

    for i in 0..10_000 {
        populate_hash(&keyspace, &format!("key:{}", i), 4);
    }

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    group.bench_function("80_read_20_write", |b| {
        let mut i = 0u64;
        b.iter(|| {
            if i % 5 == 0 {
                // 20% writes
                let key = Bytes::from(format!("key:{}", i % 10_000));
                keyspace
                    .hset(key, vec![(Bytes::from("field:0"), Bytes::from("fresh"))])
                    .unwrap();
            } else {
                // 80% reads
                let key = format!("key:{}", i % 10_000);
                black_box(keyspace.hget(key.as_bytes(), b"field:1").unwrap());
            }
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark HINCRBY operations
fn bench_hincrby(c: &mut Criterion) {
    let keyspace = Arc::new(KeySpace::new());

    let mut group = c.benchmark_group("hincrby");
    group.throughput(Throughput::Elements(1));

    // Single field (high contention)
    group.bench_function("single_field", |b| {
        b.iter(|| {
            black_box(
                keyspace
                    .hincrby(Bytes::from("stats"), Bytes::from("hits"), 1)
                    .unwrap(),
            );
        });
    });

    // Many fields in one hash (low contention on the table, one key lock)
    group.bench_function("multiple_fields", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let field = Bytes::from(format!("counter:{}", i % 1000));
            black_box(keyspace.hincrby(Bytes::from("stats"), field, 1).unwrap());
            i += 1;
        });
    });

    // Counters scattered over many keys (no shared locks)
    group.bench_function("multiple_keys", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("stats:{}", i % 1000));
            black_box(keyspace.hincrby(key, Bytes::from("hits"), 1).unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent access
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let keyspace = Arc::new(KeySpace::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let keyspace = Arc::clone(&keyspace);
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let key = Bytes::from(format!("key:{}:{}", t, i));
                            keyspace
                                .hset(
                                    key.clone(),
                                    vec![(Bytes::from("field"), Bytes::from("value"))],
                                )
                                .unwrap();
                            keyspace.hget(&key, b"field").unwrap();
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(keyspace.len());
        });
    });

    group.bench_function("4_threads_one_hash", |b| {
        b.iter(|| {
            let keyspace = Arc::new(KeySpace::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let keyspace = Arc::clone(&keyspace);
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let field = Bytes::from(format!("field:{}:{}", t, i));
                            keyspace
                                .hset(
                                    Bytes::from("shared"),
                                    vec![(field, Bytes::from("value"))],
                                )
                                .unwrap();
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(keyspace.hlen(b"shared").unwrap());
        });
    });

    group.finish();
}

/// Benchmark expiry operations
fn bench_expiry(c: &mut Criterion) {
    let keyspace = Arc::new(KeySpace::new());

    let mut group = c.benchmark_group("expiry");
    group.throughput(Throughput::Elements(1));

    group.bench_function("expire_existing", |b| {
        // Pre-create keys
        for i in 0..10_000 {
            populate_hash(&keyspace, &format!("expire:{}", i), 2);
        }

        let mut i = 0u64;
        b.iter(|| {
            let key = format!("expire:{}", i % 10_000);
            keyspace.expire(key.as_bytes(), Duration::from_secs(3600));
            i += 1;
        });
    });

    group.bench_function("ttl_lookup", |b| {
        keyspace.expire(b"expire:0", Duration::from_secs(3600));
        b.iter(|| {
            black_box(keyspace.ttl(b"expire:0"));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_hset,
    bench_hget,
    bench_hgetall,
    bench_mixed,
    bench_hincrby,
    bench_concurrent,
    bench_expiry,
);

criterion_main!(benches);
