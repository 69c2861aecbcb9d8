//! Benchmarks for the query engines.
//!
//! Measures the operations that run on every user interaction: selector
//! construction, sort cycling, pager recomputation and the extended JSON
//! round trip the composer performs on each publish.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use sieve_core::Value;
use sieve_query::{
    FilterPatch, FilterSet, FilterSlot, Operator, Pager, PagerConfig, QueryComposer,
    QueryDescriptor, QueryOptions, SortEngine, SortKey,
};

fn create_filters(count: usize) -> FilterSet {
    let mut filters = FilterSet::new();
    for i in 0..count {
        let mut slot = FilterSlot::new(format!("Field {}", i));
        if i % 3 == 0 {
            slot = slot.with_operator(Operator::with_modifier("$regex", "i"));
        }
        if i % 4 == 0 {
            slot = slot.with_condition("$or");
        }
        filters.insert(format!("field_{}", i), slot);
    }
    for i in (0..count).step_by(2) {
        let _ = filters.set(&format!("field_{}", i), FilterPatch::value(Value::from(i as i64)));
    }
    filters
}

fn create_descriptor(filters: usize) -> QueryDescriptor {
    QueryDescriptor {
        selector: create_filters(filters).selector(),
        options: QueryOptions {
            sort: vec![SortKey::new("name", "asc"), SortKey::new("created", "desc")],
            skip: Some(40),
            limit: Some(20),
        },
        force: Some(1_700_000_000_000),
    }
}

fn bench_selector(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_selector");
    for count in [8, 64, 256] {
        let filters = create_filters(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &filters, |b, filters| {
            b.iter(|| black_box(filters.selector()))
        });
    }
    group.finish();
}

fn bench_sort_cycle(c: &mut Criterion) {
    c.bench_function("sort_set_cycle", |b| {
        b.iter_batched(
            || SortEngine::new(Vec::new()),
            |mut sort| {
                for i in 0..32 {
                    let field = format!("f{}", i % 8);
                    let _ = sort.set(&field, None);
                }
                black_box(sort.spec())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_pager(c: &mut Criterion) {
    let mut group = c.benchmark_group("pager_set_totals");
    for total in [100, 10_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(total), &total, |b, &total| {
            b.iter_batched(
                || Pager::new(PagerConfig::default()),
                |mut pager| {
                    pager.set_totals(total);
                    pager.move_last();
                    black_box(pager.snapshot())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_composer(c: &mut Criterion) {
    let mut group = c.benchmark_group("composer_round_trip");
    for filters in [8, 64] {
        let descriptor = create_descriptor(filters);
        group.bench_with_input(
            BenchmarkId::from_parameter(filters),
            &descriptor,
            |b, descriptor| {
                b.iter_batched(
                    QueryComposer::new,
                    |mut composer| {
                        let _ = composer.set(descriptor);
                        black_box(composer.get())
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_selector, bench_sort_cycle, bench_pager, bench_composer);
criterion_main!(benches);
