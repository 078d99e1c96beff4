//! Criterion microbenches for cets-model decoding, encoding and header
//! parsing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Dataset JSON parsing (from_json_str)
//! - Transformation decode and encode through the `type` dispatch
//! - Standard pipeline construction
//! - MRC header parsing (parse_mrc_header)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use cets_model::header::parse_mrc_header;
use cets_model::model::io_json::{
    from_json_str, transformation_from_json_str, transformation_to_json_string,
};
use cets_model::standard::aligned_map_to_tomogram;

// Include test fixtures at compile time (no file I/O during benchmark)
const DATASET_FIXTURE: &str = include_str!("../tests/fixtures/valid_dataset.json");

const IDENTITY3: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

fn rotation() -> Vec<Vec<f64>> {
    IDENTITY3.iter().map(|row| row.to_vec()).collect()
}

/// A little-endian MRC header for a 512^3 volume at 2 Å.
fn mrc_header_bytes() -> Vec<u8> {
    let mut bytes = vec![0u8; 1024];
    for (offset, value) in [(0, 512i32), (4, 512), (8, 512), (12, 2), (28, 512), (32, 512), (36, 512)]
    {
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
    for offset in [40, 44, 48] {
        bytes[offset..offset + 4].copy_from_slice(&1024.0f32.to_le_bytes());
    }
    bytes[208..212].copy_from_slice(b"MAP ");
    bytes[212] = 0x44;
    bytes[213] = 0x44;
    bytes
}

/// Benchmark dataset JSON parsing from string.
fn bench_dataset_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset_parse");
    group.throughput(Throughput::Bytes(DATASET_FIXTURE.len() as u64));

    group.bench_function("from_json_str", |b| {
        b.iter(|| {
            let ds = from_json_str(black_box(DATASET_FIXTURE)).unwrap();
            black_box(ds)
        })
    });

    group.finish();
}

/// Benchmark transformation decode and encode.
///
/// The map pipeline is built once and encoded to JSON outside the timed
/// region; each iteration then decodes (or encodes) the nested sequence.
fn bench_transformation_codec(c: &mut Criterion) {
    let pipeline = aligned_map_to_tomogram(Some(2.0), Some(&rotation()), Some(&[1.0, 2.0, 3.0]))
        .expect("Failed to build map pipeline");
    let json = transformation_to_json_string(&pipeline.transformation)
        .expect("Failed to encode map pipeline");

    let mut group = c.benchmark_group("transformation_codec");
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| {
            let tf = transformation_from_json_str(black_box(&json)).unwrap();
            black_box(tf)
        })
    });

    group.bench_function("encode", |b| {
        b.iter(|| {
            let out = transformation_to_json_string(black_box(&pipeline.transformation)).unwrap();
            black_box(out)
        })
    });

    group.finish();
}

/// Benchmark building the three-step map alignment.
fn bench_pipeline_build(c: &mut Criterion) {
    let rotation = rotation();

    c.bench_function("aligned_map_to_tomogram", |b| {
        b.iter(|| {
            let pipeline = aligned_map_to_tomogram(
                black_box(Some(1.5)),
                black_box(Some(&rotation)),
                black_box(Some(&[4.0, 5.0, 6.0])),
            )
            .unwrap();
            black_box(pipeline)
        })
    });
}

/// Benchmark MRC header parsing.
fn bench_mrc_header(c: &mut Criterion) {
    let bytes = mrc_header_bytes();

    let mut group = c.benchmark_group("header_parse");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("parse_mrc_header", |b| {
        b.iter(|| {
            let header = parse_mrc_header(black_box(&bytes)).unwrap();
            black_box(header.to_volume_header())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_dataset_parse,
    bench_transformation_codec,
    bench_pipeline_build,
    bench_mrc_header,
);
criterion_main!(benches);
