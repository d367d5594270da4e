#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ndfilter_core::pipeline::RecordPredicate;
use ndfilter_core::record::Record;
use ndfilter_pipeline::predicate::PredicateSet;
use ndfilter_pipeline::projector::Projection;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 필드 → 패턴 (최대 8개로 제한)
    filters: Vec<(String, String)>,
    /// 매칭 대상 레코드 필드
    fields: Vec<(String, String)>,
    /// 프로젝션 목록 (쉼표 구분)
    project: String,
}

fuzz_target!(|input: FuzzInput| {
    let filters: BTreeMap<String, String> = input.filters.into_iter().take(8).collect();
    let set = PredicateSet::from_filters(&filters);

    let record = Record::new(input.fields.into_iter().take(32).collect());
    let kept = set.matches(&record);

    // 필터가 없으면 항상 통과
    if filters.is_empty() {
        assert!(kept);
    }

    if kept {
        let projection = Projection::parse(&input.project);
        let projected = projection.apply(record);
        if let Projection::Fields(fields) = &projection {
            assert_eq!(projected.len(), fields.len());
        }
    }
});
