#![no_main]

use libfuzzer_sys::fuzz_target;
use ndfilter_pipeline::predicate::{PredicateSet, parse_filter_spec};

fuzz_target!(|data: &[u8]| {
    if let Ok(spec) = std::str::from_utf8(data) {
        if let Ok(filters) = parse_filter_spec(spec) {
            // 파싱된 명세는 잘못된 정규식이 있어도 조건 집합을 만들 수 있어야 함
            let set = PredicateSet::from_filters(&filters);
            assert_eq!(set.len(), filters.len());
            assert!(filters.keys().all(|k| !k.is_empty()));
        }
    }
});
