//! Benchmarks for source parsing.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use pandora::parse::{detect_layout, segment};

const LECTURE: &str = include_str!("../tests/fixtures/lecture.tex");

/// A long document made of the fixture repeated with page breaks between.
fn long_source(copies: usize) -> String {
    vec![LECTURE; copies].join("\n\\newpage\n")
}

fn bench_segment_fixture(c: &mut Criterion) {
    c.bench_function("segment_fixture", |b| {
        b.iter(|| segment(LECTURE));
    });
}

fn bench_segment_long(c: &mut Criterion) {
    let source = long_source(200);
    c.bench_function("segment_long", |b| {
        b.iter(|| segment(&source));
    });
}

fn bench_detect_layout(c: &mut Criterion) {
    let source = long_source(200);
    c.bench_function("detect_layout_long", |b| {
        b.iter(|| detect_layout(&source));
    });
}

criterion_group!(
    benches,
    bench_segment_fixture,
    bench_segment_long,
    bench_detect_layout
);
criterion_main!(benches);
