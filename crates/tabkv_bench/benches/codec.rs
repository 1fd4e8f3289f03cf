//! Key codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tabkv_bench::random_fields;
use tabkv_codec::{append_terminal, decode, decode_entry, encode, KeyEncoder, OrderedKey};

/// Benchmark encoding field lists of growing width.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for count in [1, 3, 8] {
        let fields = random_fields(count, 16);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &fields, |b, fields| {
            b.iter(|| black_box(encode(black_box(fields))));
        });
    }

    group.finish();
}

/// Benchmark splitting keys back into fields.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for count in [1, 3, 8] {
        let key = encode(&random_fields(count, 16));
        group.throughput(Throughput::Bytes(key.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &key, |b, key| {
            b.iter(|| black_box(decode(black_box(key)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark the index entry path: build with a primary key, then split.
fn bench_entry(c: &mut Criterion) {
    let fields = random_fields(3, 12);
    let pk = 42u64.to_ordered_bytes();

    c.bench_function("entry_build_and_split", |b| {
        b.iter(|| {
            let key = append_terminal(encode(black_box(&fields)), &pk);
            black_box(decode_entry(&key).unwrap())
        });
    });
}

/// Benchmark the incremental builder against collecting fields first.
fn bench_key_encoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_encoder");

    group.bench_function("ordered_fields", |b| {
        b.iter(|| {
            let mut key = KeyEncoder::with_capacity(32);
            key.field(black_box(b"book"))
                .ordered(black_box(&7u32))
                .ordered(black_box(&-12i64))
                .field(black_box(b"East"));
            black_box(key.into_bytes())
        });
    });

    group.bench_function("collect_then_encode", |b| {
        b.iter(|| {
            let fields = [
                b"book".to_vec(),
                black_box(7u32).to_ordered_bytes(),
                black_box(-12i64).to_ordered_bytes(),
                b"East".to_vec(),
            ];
            black_box(encode(&fields))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_entry,
    bench_key_encoder
);
criterion_main!(benches);
