//! # Engine Benchmarks
//!
//! Performance benchmarks for fitscope-core search, filter building and
//! store selection.
//!
//! Run with: `cargo bench -p fitscope-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fitscope_core::{
    Catalog, CategoryId, CategoryPolicy, FacetSelection, FitId, FitRecord, FitStore, Group,
    GroupId, Item, ItemId, MemoryStore, build_filter, matcher::search,
};
use std::hint::black_box;

const GROUPS: u32 = 64;

/// Catalog with `size` items spread evenly over a fixed set of groups.
fn create_catalog(size: u32) -> Catalog {
    let mut builder = Catalog::builder();
    for g in 1..=GROUPS {
        let category = match g % 4 {
            0 => CategoryId(6),
            1 => CategoryId(7),
            2 => CategoryId(8),
            _ => CategoryId(32),
        };
        builder.add_group(Group::new(GroupId(g), format!("Group {g} Launcher"), category));
    }
    for i in 1..=size {
        let group = GroupId(i % GROUPS + 1);
        builder.add_item(Item::new(ItemId(i), format!("Heavy Missile Launcher {i}"), group));
    }
    builder.build(CategoryPolicy::default())
}

/// Store with `size` fits, each carrying a handful of modules.
fn create_store(size: u64, items: u32) -> MemoryStore {
    (1..=size)
        .map(|id| {
            let mut fit = FitRecord::new(FitId(id), ItemId((id as u32) % items + 1), 0);
            fit.hi = (0..4).map(|k| ItemId((id as u32 + k) % items + 1)).collect();
            fit.low = (0..3).map(|k| ItemId((id as u32 * 7 + k) % items + 1)).collect();
            fit
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1_000u32, 10_000, 50_000].iter() {
        let catalog = create_catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(search(&catalog, black_box("launcher heavy"))));
        });
    }

    group.finish();
}

fn bench_build_filter(c: &mut Criterion) {
    let catalog = create_catalog(10_000);
    let selection = FacetSelection::new()
        .with_ship(4)
        .with_item(10)
        .with_item(20)
        .with_group(3)
        .with_group(7);

    c.bench_function("build_filter", |b| {
        b.iter(|| black_box(build_filter(&catalog, black_box(&selection))));
    });
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_select");
    let catalog = create_catalog(1_000);
    let planned = build_filter(&catalog, &FacetSelection::new().with_group(5));

    for size in [1_000u64, 10_000, 100_000].iter() {
        let store = create_store(*size, 1_000);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(store.select(&planned.filter).expect("select")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_search, bench_build_filter, bench_select);
criterion_main!(benches);
