//! CORDIC engine and codec benchmarks
//!
//! Run with: cargo bench -p qcordic-core --bench cordic_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qcordic_core::{encode, CordicEngine, CordicLut, QFormat};

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("cordic_engine");

    for iterations in [8usize, 16, 24, 32].iter() {
        let engine = CordicEngine::new(*iterations).unwrap();
        group.throughput(Throughput::Elements(*iterations as u64));

        group.bench_with_input(BenchmarkId::new("rotate", iterations), iterations, |b, _| {
            b.iter(|| engine.rotate(black_box(1.0), black_box(0.0), black_box(0.785398)))
        });
        group.bench_with_input(BenchmarkId::new("vector", iterations), iterations, |b, _| {
            b.iter(|| engine.vector(black_box(3.0), black_box(4.0), black_box(0.0)))
        });
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_point");
    let fmt = QFormat::new(3, 28).unwrap();

    group.bench_function("encode", |b| b.iter(|| encode(black_box(1.234567), fmt)));
    group.bench_function("lut_quantize_32", |b| {
        let lut = CordicLut::generate(32).unwrap();
        b.iter(|| lut.quantize(black_box(fmt)))
    });

    group.finish();
}

criterion_group!(benches, bench_engine, bench_codec);
criterion_main!(benches);
