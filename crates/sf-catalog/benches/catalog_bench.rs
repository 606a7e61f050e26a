//! Catalog lookup benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sf_catalog::{RouteCatalog, StyleCatalog};

fn bench_route_lookup(c: &mut Criterion) {
    let catalog = RouteCatalog::with_builtins();
    c.bench_function("route_lookup_normalized", |b| {
        b.iter(|| catalog.try_get(black_box("Gameplay")))
    });
}

fn bench_style_lookup(c: &mut Criterion) {
    let catalog = StyleCatalog::with_builtins();
    c.bench_function("style_lookup_normalized", |b| {
        b.iter(|| catalog.try_get(black_box("INSTANT")))
    });
}

criterion_group!(benches, bench_route_lookup, bench_style_lookup);
criterion_main!(benches);
