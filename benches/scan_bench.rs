//! Criterion benchmarks for edge scanning and the angle sweep.
//!
//! Both run on a synthetic 400x400 page with a 20 pixel black border.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::Rgba;

use bwcrop::{
    AngleSearch, BorderScanner, Edge, NoopProgress, Rgba16Image, ScanConfig, SearchOptions,
    Thresholds,
};

const SIZE: u32 = 400;
const BORDER: u32 = 20;

fn bordered_page() -> Rgba16Image {
    Rgba16Image::from_fn(SIZE, SIZE, |x, y| {
        let inside = (BORDER..SIZE - BORDER).contains(&x) && (BORDER..SIZE - BORDER).contains(&y);
        if inside {
            Rgba([u16::MAX; 4])
        } else {
            Rgba([0, 0, 0, u16::MAX])
        }
    })
}

/// All four edge scans of one page
fn bench_edge_scans(c: &mut Criterion) {
    let page = bordered_page();
    let configs =
        Edge::all().map(|edge| ScanConfig::for_edge(edge, SIZE, SIZE, Thresholds::default()));

    c.bench_function("edge_scans (400x400)", |b| {
        b.iter(|| {
            for config in &configs {
                black_box(BorderScanner::scan(black_box(&page), config));
            }
        });
    });
}

/// Coarse 21-angle sweep with nearest-neighbor rotation
fn bench_coarse_sweep(c: &mut Criterion) {
    let page = bordered_page();
    let search = AngleSearch::new(SearchOptions::coarse());

    let mut group = c.benchmark_group("angle_sweep");
    group.sample_size(10);
    group.bench_function("coarse (400x400)", |b| {
        b.iter(|| black_box(search.search(black_box(&page), &NoopProgress)));
    });
    group.finish();
}

criterion_group!(benches, bench_edge_scans, bench_coarse_sweep);
criterion_main!(benches);
