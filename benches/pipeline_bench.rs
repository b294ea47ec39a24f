use criterion::{criterion_group, criterion_main, Criterion};
use glam::DVec3;
use matchviz::color::{distinct_point_colors, propagate_point_colors, IdPalette, UNMATCHED};
use matchviz::geometry::{apply_transform, compose_transform, Quaternion};
use matchviz::matching::{DensePartition, MatchTable, PointMatch};
use std::hint::black_box;

fn cloud(n: usize) -> Vec<DVec3> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.001;
            DVec3::new(t.cos() * 20.0, t.sin() * 20.0, t)
        })
        .collect()
}

fn table(n: usize) -> MatchTable {
    MatchTable {
        dense: (0..n as i64 / 3)
            .map(|i| PointMatch::new(i, (i * 7) % n as i64))
            .collect(),
        ..MatchTable::default()
    }
}

fn transform_benchmark(c: &mut Criterion) {
    let m = compose_transform(
        Quaternion::new(0.98, 0.1, -0.1, 0.12),
        DVec3::new(1.5, -2.0, 0.3),
    );
    let mut group = c.benchmark_group("apply_transform");
    for n in [1_000, 100_000, 1_000_000] {
        let points = cloud(n);
        group.bench_function(format!("{n}_points"), |b| {
            b.iter(|| black_box(apply_transform(&m, black_box(&points))));
        });
    }
    group.finish();
}

fn partition_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_partition");
    for n in [1_000, 100_000, 1_000_000] {
        let t = table(n);
        group.bench_function(format!("{n}_points"), |b| {
            b.iter(|| black_box(DensePartition::compute(black_box(&t), n)));
        });
    }
    group.finish();
}

fn coloring_benchmark(c: &mut Criterion) {
    let n = 100_000;
    let t = table(n);
    let source = distinct_point_colors(n, &IdPalette::default());
    c.bench_function("propagate_point_colors_100k", |b| {
        b.iter(|| {
            black_box(propagate_point_colors(n, &t.dense, &source, UNMATCHED))
        });
    });
}

criterion_group!(benches, transform_benchmark, partition_benchmark, coloring_benchmark);
criterion_main!(benches);
