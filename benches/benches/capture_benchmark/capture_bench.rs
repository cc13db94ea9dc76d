//! Бенчмарки горячего пути захвата: LUT-преобразование блока,
//! средняя магнитуда и разбор размеров.
//!
//! Запуск: cargo bench --package iqcap-benchmark

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use iqcap_core::{mean, ByteSize, MagLut, RunningExtrema};
use rand::Rng;

/// Сырой IQ блок со случайными байтами.
fn random_block(pairs: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();

    (0..pairs * 2).map(|_| rng.gen()).collect()
}

fn bench_mag_lut_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("MagLut");
    let lut = MagLut::new();

    for &pairs in &[1_024usize, 4_096, 16_384] {
        let raw = random_block(pairs);
        let mut out = vec![0f64; pairs];

        group.throughput(Throughput::Bytes((pairs * 2) as u64));
        group.bench_with_input(BenchmarkId::new("apply", pairs), &raw, |b, raw| {
            b.iter(|| lut.apply(black_box(raw), black_box(&mut out)));
        });
    }

    group.finish();
}

fn bench_block_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("BlockStats");
    let lut = MagLut::new();
    let raw = random_block(4_096);
    let mut magnitudes = vec![0f64; 4_096];
    lut.apply(&raw, &mut magnitudes);

    group.throughput(Throughput::Elements(4_096));
    group.bench_function("mean_4096", |b| {
        b.iter(|| mean(black_box(&magnitudes)));
    });

    // Полный по-блочный путь цикла захвата
    group.bench_function("block_pipeline_4096", |b| {
        let mut extrema = RunningExtrema::new();
        let mut out = vec![0f64; 4_096];

        b.iter(|| {
            lut.apply(black_box(&raw), &mut out);
            let m = mean(&out);
            extrema.observe(m);
            m
        });
    });

    group.finish();
}

fn bench_bytesize_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("ByteSize");

    for input in ["8192", "1.5M", "2G"] {
        group.bench_with_input(BenchmarkId::new("parse", input), input, |b, s| {
            b.iter(|| s.parse::<ByteSize>().unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mag_lut_apply,
    bench_block_stats,
    bench_bytesize_parse,
);
criterion_main!(benches);
