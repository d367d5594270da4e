//! 필터 벤치마크
//!
//! 조건 수에 따른 매칭 성능과 불일치 단락 평가를 측정합니다.

use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndfilter_core::Record;
use ndfilter_core::pipeline::RecordPredicate;
use ndfilter_pipeline::{PredicateSet, Projection};

fn create_record(width: usize) -> Record {
    (0..width)
        .map(|i| (format!("field_{i:03}"), format!("value-{i}-payload")))
        .collect()
}

fn create_filters(count: usize) -> BTreeMap<String, String> {
    (0..count)
        .map(|i| (format!("field_{i:03}"), format!("^value-{i}-")))
        .collect()
}

fn bench_predicate_scaling(c: &mut Criterion) {
    let record = create_record(32);
    let mut group = c.benchmark_group("predicate_scaling");
    for count in [1usize, 4, 16] {
        let set = PredicateSet::from_filters(&create_filters(count));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &set, |b, set| {
            b.iter(|| set.matches(black_box(&record)))
        });
    }
    group.finish();
}

fn bench_predicate_missing_field(c: &mut Criterion) {
    let record = create_record(8);
    let mut filters = create_filters(4);
    filters.insert("absent".to_owned(), "x".to_owned());
    let set = PredicateSet::from_filters(&filters);
    c.bench_function("predicate_missing_field", |b| {
        b.iter(|| set.matches(black_box(&record)))
    });
}

fn bench_projection(c: &mut Criterion) {
    let record = create_record(32);
    let projection = Projection::parse("field_001,field_010,field_020,absent");
    c.bench_function("project_four_fields", |b| {
        b.iter(|| projection.apply(black_box(record.clone())))
    });
}

criterion_group!(
    benches,
    bench_predicate_scaling,
    bench_predicate_missing_field,
    bench_projection
);
criterion_main!(benches);
